//! Seams between the feed logic and the database.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewAccount, NewCustomer, NewTransaction};

/// Database failure, split by whether the session survived it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection lost: {0}")]
    Disconnected(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_disconnect(&err) {
            StoreError::Disconnected(err)
        } else {
            StoreError::Query(err)
        }
    }
}

/// True when `err` means the connection itself is unusable, as opposed to a
/// statement being rejected.
pub fn is_disconnect(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::WorkerCrashed => true,
        // SQLSTATE class 08 (connection exception) and 57P0x (operator shutdown)
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| code.starts_with("08") || code.starts_with("57P"))
            .unwrap_or(false),
        _ => false,
    }
}

/// A live transactional handle. Owned by the feed loop and lent to the
/// iteration runner one call at a time.
#[async_trait]
pub trait Session: Send {
    async fn begin(&mut self) -> Result<(), StoreError>;

    /// Returns the store-assigned customer id.
    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<i64, StoreError>;

    /// Returns the store-assigned account id.
    async fn insert_account(&mut self, account: &NewAccount) -> Result<i64, StoreError>;

    async fn insert_transaction(&mut self, txn: &NewTransaction) -> Result<i64, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;

    async fn close(self) -> Result<(), StoreError>;
}

/// Opens new sessions. One call is one connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    async fn open(&self) -> Result<Self::Session, sqlx::Error>;
}
