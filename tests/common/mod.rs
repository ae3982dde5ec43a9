//! In-memory stand-in for Postgres: enforces foreign keys, stages writes until
//! commit, and can be told to fail in specific ways.
#![allow(dead_code)]

use async_trait::async_trait;
use bank_feeder::domain::{NewAccount, NewCustomer, NewTransaction};
use bank_feeder::ports::{Connector, Session, StoreError};
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub customers: Vec<(i64, NewCustomer)>,
    pub accounts: Vec<(i64, NewAccount)>,
    pub transactions: Vec<(i64, NewTransaction)>,
}

impl Tables {
    fn append(&mut self, other: Tables) {
        self.customers.extend(other.customers);
        self.accounts.extend(other.accounts);
        self.transactions.extend(other.transactions);
    }
}

#[derive(Default)]
pub struct DbState {
    pub committed: Tables,
    next_id: i64,
    /// Connection attempts, successful or not.
    pub connect_attempts: u32,
    pub sessions_opened: u32,
    pub sessions_closed: u32,
    pub commits: u32,
    pub rollbacks: u32,
    /// Refuse this many connection attempts before accepting.
    pub refuse_connects: u32,
    /// Refuse every attempt once a first session has been opened.
    pub refuse_reconnects: bool,
    txn_inserts: usize,
    /// 1-based transaction insert (counted across the run) that violates a constraint.
    pub reject_txn_insert: Option<usize>,
    /// 1-based transaction insert (counted across the run) that drops the connection.
    pub drop_on_txn_insert: Option<usize>,
    pub fail_rollback: bool,
    /// Signal shutdown once this many commits happened.
    pub shutdown_after_commits: Option<(u32, watch::Sender<bool>)>,
}

#[derive(Clone, Default)]
pub struct FakeDb {
    state: Arc<Mutex<DbState>>,
}

impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut DbState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn inspect<T>(&self, f: impl FnOnce(&DbState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn committed(&self) -> Tables {
        self.inspect(|s| s.committed.clone())
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector { db: self.clone() }
    }
}

pub struct FakeConnector {
    db: FakeDb,
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, sqlx::Error> {
        let mut state = self.db.state.lock().unwrap();
        state.connect_attempts += 1;

        let refuse = if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            true
        } else {
            state.refuse_reconnects && state.sessions_opened > 0
        };
        if refuse {
            return Err(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        state.sessions_opened += 1;
        Ok(FakeSession {
            db: self.db.clone(),
            pending: None,
            alive: true,
        })
    }
}

pub struct FakeSession {
    db: FakeDb,
    pending: Option<Tables>,
    alive: bool,
}

fn disconnected() -> StoreError {
    StoreError::Disconnected(sqlx::Error::Io(io::Error::new(
        io::ErrorKind::ConnectionReset,
        "server closed the connection unexpectedly",
    )))
}

fn violation(message: &str) -> StoreError {
    StoreError::Query(sqlx::Error::Decode(message.to_string().into()))
}

impl FakeSession {
    fn check(&self) -> Result<(), StoreError> {
        if !self.alive {
            return Err(disconnected());
        }
        if self.pending.is_none() {
            return Err(violation("no transaction in progress"));
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        let mut state = self.db.state.lock().unwrap();
        state.next_id += 1;
        state.next_id
    }

    fn visible_customers(&self) -> HashSet<i64> {
        let mut ids: HashSet<i64> = self.db.inspect(|s| s.committed.customers.iter().map(|(id, _)| *id).collect());
        if let Some(pending) = &self.pending {
            ids.extend(pending.customers.iter().map(|(id, _)| *id));
        }
        ids
    }

    fn visible_accounts(&self) -> HashSet<i64> {
        let mut ids: HashSet<i64> = self.db.inspect(|s| s.committed.accounts.iter().map(|(id, _)| *id).collect());
        if let Some(pending) = &self.pending {
            ids.extend(pending.accounts.iter().map(|(id, _)| *id));
        }
        ids
    }

    fn email_taken(&self, email: &str) -> bool {
        let committed = self.db.inspect(|s| s.committed.customers.iter().any(|(_, c)| c.email == email));
        committed
            || self
                .pending
                .as_ref()
                .map(|p| p.customers.iter().any(|(_, c)| c.email == email))
                .unwrap_or(false)
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn begin(&mut self) -> Result<(), StoreError> {
        if !self.alive {
            return Err(disconnected());
        }
        self.pending = Some(Tables::default());
        Ok(())
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<i64, StoreError> {
        self.check()?;
        if self.email_taken(&customer.email) {
            return Err(violation("duplicate key value violates unique constraint \"customers_email_key\""));
        }
        let id = self.next_id();
        if let Some(pending) = self.pending.as_mut() {
            pending.customers.push((id, customer.clone()));
        }
        Ok(id)
    }

    async fn insert_account(&mut self, account: &NewAccount) -> Result<i64, StoreError> {
        self.check()?;
        if !self.visible_customers().contains(&account.customer_id) {
            return Err(violation("insert on accounts violates foreign key constraint"));
        }
        let id = self.next_id();
        if let Some(pending) = self.pending.as_mut() {
            pending.accounts.push((id, account.clone()));
        }
        Ok(id)
    }

    async fn insert_transaction(&mut self, txn: &NewTransaction) -> Result<i64, StoreError> {
        self.check()?;

        let (nth, reject_at, drop_at) = {
            let mut state = self.db.state.lock().unwrap();
            state.txn_inserts += 1;
            (state.txn_inserts, state.reject_txn_insert, state.drop_on_txn_insert)
        };
        if drop_at == Some(nth) {
            // Server side discards the open transaction with the connection.
            self.alive = false;
            self.pending = None;
            return Err(disconnected());
        }
        if reject_at == Some(nth) {
            return Err(violation("new row for relation \"transactions\" violates check constraint"));
        }

        let accounts = self.visible_accounts();
        let related_ok = txn.related_account_id.map(|id| accounts.contains(&id)).unwrap_or(true);
        if !accounts.contains(&txn.account_id) || !related_ok {
            return Err(violation("insert on transactions violates foreign key constraint"));
        }

        let id = self.next_id();
        if let Some(pending) = self.pending.as_mut() {
            pending.transactions.push((id, txn.clone()));
        }
        Ok(id)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.check()?;
        let pending = self.pending.take().unwrap_or_default();

        let mut state = self.db.state.lock().unwrap();
        state.committed.append(pending);
        state.commits += 1;
        if let Some((after, tx)) = &state.shutdown_after_commits {
            if state.commits >= *after {
                let _ = tx.send(true);
            }
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.alive {
            return Err(disconnected());
        }
        self.pending = None;
        let mut state = self.db.state.lock().unwrap();
        state.rollbacks += 1;
        if state.fail_rollback {
            return Err(violation("rollback refused"));
        }
        Ok(())
    }

    async fn close(self) -> Result<(), StoreError> {
        self.db.configure(|s| s.sessions_closed += 1);
        Ok(())
    }
}
