use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::FeederError;
use crate::ports::Connector;

/// Fixed-delay retry schedule for opening sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.connect_retries, config.connect_retry_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3))
    }
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: RetryPolicy,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    /// Opens a session, retrying with a fixed delay. Running out of attempts
    /// is fatal for the caller.
    pub async fn connect(&self) -> Result<C::Session, FeederError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.connector.open().await {
                Ok(session) => {
                    tracing::info!("Connected to Postgres (attempt {}/{})", attempt, max_attempts);
                    return Ok(session);
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        "Attempt {}/{}: Failed to connect to DB. Retrying in {:?}... ({})",
                        attempt,
                        max_attempts,
                        self.policy.delay,
                        e
                    );
                    sleep(self.policy.delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Could not connect to Postgres after {} attempts: {}",
                        max_attempts,
                        e
                    );
                    return Err(FeederError::ConnectExhausted {
                        attempts: max_attempts,
                        source: e,
                    });
                }
            }
        }
    }

    /// Replaces a lost session. Same retry contract as [`connect`](Self::connect).
    pub async fn reconnect(&self) -> Result<C::Session, FeederError> {
        tracing::warn!("Lost connection to database. Reconnecting...");
        self.connect().await
    }
}
