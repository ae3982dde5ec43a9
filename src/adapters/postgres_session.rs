//! Postgres implementation of the session ports.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};

use crate::config::Config;
use crate::db::{self, queries};
use crate::domain::{NewAccount, NewCustomer, NewTransaction};
use crate::ports::{Connector, Session, StoreError};

/// Single Postgres connection with explicit transaction control.
pub struct PgSession {
    conn: PgConnection,
}

impl PgSession {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Session for PgSession {
    async fn begin(&mut self) -> Result<(), StoreError> {
        self.conn.execute("BEGIN").await?;
        Ok(())
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<i64, StoreError> {
        Ok(queries::insert_customer(&mut self.conn, customer).await?)
    }

    async fn insert_account(&mut self, account: &NewAccount) -> Result<i64, StoreError> {
        Ok(queries::insert_account(&mut self.conn, account).await?)
    }

    async fn insert_transaction(&mut self, txn: &NewTransaction) -> Result<i64, StoreError> {
        Ok(queries::insert_transaction(&mut self.conn, txn).await?)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.conn.execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.conn.execute("ROLLBACK").await?;
        Ok(())
    }

    async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Opens [`PgSession`]s from the configured coordinates.
#[derive(Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            options: db::connect_options(config),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn open(&self) -> Result<PgSession, sqlx::Error> {
        let conn = PgConnection::connect_with(&self.options).await?;
        Ok(PgSession::new(conn))
    }
}
