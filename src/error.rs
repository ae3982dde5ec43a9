use thiserror::Error;

use crate::connector::ConnectorError;
use crate::generator::GenerationError;
use crate::ports::StoreError;

#[derive(Error, Debug)]
pub enum FeederError {
    #[error("Missing required environment variable(s): {0}")]
    MissingConfig(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Could not connect to Postgres after {attempts} attempts: {source}")]
    ConnectExhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Connector registration failed: {0}")]
    Connector(#[from] ConnectorError),
}

/// How the feed loop must react to a failed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The session is gone; reconnect and keep going.
    Reconnect,
    /// The batch was rolled back; continue with the next iteration.
    Continue,
    /// State is unknown; stop the loop.
    Fatal,
}

#[derive(Error, Debug)]
pub enum IterationError {
    #[error("Lost connection to database: {0}")]
    Disconnected(#[source] sqlx::Error),

    #[error("Batch rejected by database: {0}")]
    Rejected(#[source] sqlx::Error),

    #[error("Failed to generate batch data: {0}")]
    Generation(#[from] GenerationError),

    #[error("Rollback failed after {cause}: {source}")]
    Unexpected {
        cause: String,
        #[source]
        source: sqlx::Error,
    },
}

impl IterationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IterationError::Disconnected(_) => FailureKind::Reconnect,
            IterationError::Rejected(_) | IterationError::Generation(_) => FailureKind::Continue,
            IterationError::Unexpected { .. } => FailureKind::Fatal,
        }
    }
}

impl From<StoreError> for IterationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Disconnected(e) => IterationError::Disconnected(e),
            StoreError::Query(e) => IterationError::Rejected(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_requires_reconnect() {
        let error = IterationError::from(StoreError::Disconnected(sqlx::Error::PoolClosed));
        assert_eq!(error.kind(), FailureKind::Reconnect);
    }

    #[test]
    fn test_query_failure_continues() {
        let error = IterationError::from(StoreError::Query(sqlx::Error::RowNotFound));
        assert_eq!(error.kind(), FailureKind::Continue);
    }

    #[test]
    fn test_generation_failure_continues() {
        let error = IterationError::Generation(GenerationError::EmptyAccountPool);
        assert_eq!(error.kind(), FailureKind::Continue);
    }

    #[test]
    fn test_failed_rollback_is_fatal() {
        let error = IterationError::Unexpected {
            cause: "duplicate key".to_string(),
            source: sqlx::Error::RowNotFound,
        };
        assert_eq!(error.kind(), FailureKind::Fatal);
        assert!(error.to_string().starts_with("Rollback failed after duplicate key"));
    }

    #[test]
    fn test_missing_config_message() {
        let error = FeederError::MissingConfig("POSTGRES_HOST".to_string());
        assert_eq!(
            error.to_string(),
            "Missing required environment variable(s): POSTGRES_HOST"
        );
    }
}
