use crate::domain::{BatchCounts, BatchSummary};
use crate::error::{FailureKind, IterationError};
use crate::generator::EntityGenerator;
use crate::ports::{Session, StoreError};

/// Writes one batch of customers, accounts and transactions as a single
/// database transaction.
pub struct IterationRunner {
    generator: EntityGenerator,
    counts: BatchCounts,
}

impl IterationRunner {
    pub fn new(generator: EntityGenerator, counts: BatchCounts) -> Self {
        Self { generator, counts }
    }

    /// Commits the whole batch or nothing. A returned error has already been
    /// rolled back unless it is a disconnection, in which case the server
    /// discards the open transaction along with the connection.
    pub async fn run<S: Session>(&mut self, session: &mut S) -> Result<BatchSummary, IterationError> {
        session.begin().await?;

        let written = self.write_batch(session).await;
        let committed = match written {
            Ok(summary) => session
                .commit()
                .await
                .map(|()| summary)
                .map_err(IterationError::from),
            Err(e) => Err(e),
        };

        match committed {
            Ok(summary) => Ok(summary),
            Err(err) => Err(abort(session, err).await),
        }
    }

    async fn write_batch<S: Session>(&mut self, session: &mut S) -> Result<BatchSummary, IterationError> {
        let mut customer_ids = Vec::with_capacity(self.counts.customers);
        for _ in 0..self.counts.customers {
            let customer = self.generator.customer();
            customer_ids.push(session.insert_customer(&customer).await?);
        }

        // Pool spans the whole iteration, not a single customer.
        let mut account_ids =
            Vec::with_capacity(self.counts.customers * self.counts.accounts_per_customer);
        for &customer_id in &customer_ids {
            for _ in 0..self.counts.accounts_per_customer {
                let account = self.generator.account(customer_id)?;
                account_ids.push(session.insert_account(&account).await?);
            }
        }

        for _ in 0..self.counts.transactions {
            let txn = self.generator.transaction(&account_ids)?;
            session.insert_transaction(&txn).await?;
        }

        Ok(BatchSummary {
            customers: customer_ids.len(),
            accounts: account_ids.len(),
            transactions: self.counts.transactions,
        })
    }
}

async fn abort<S: Session>(session: &mut S, err: IterationError) -> IterationError {
    if err.kind() == FailureKind::Reconnect {
        return err;
    }

    match session.rollback().await {
        Ok(()) => err,
        Err(StoreError::Disconnected(e)) => IterationError::Disconnected(e),
        Err(StoreError::Query(e)) => IterationError::Unexpected {
            cause: err.to_string(),
            source: e,
        },
    }
}
