//! Synthetic attribute sets for customers, accounts and transactions.
//!
//! Pure: no I/O, and fully reproducible when built from a seed.

use bigdecimal::BigDecimal;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::domain::entities::CURRENCY;
use crate::domain::money::{self, MoneyError};
use crate::domain::{AccountType, NewAccount, NewCustomer, NewTransaction, TxnStatus, TxnType};

const EMAIL_DOMAIN: &str = "example.com";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("no accounts available to attach a transaction to")]
    EmptyAccountPool,
}

/// Amount ranges used when generating accounts and transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountRanges {
    pub initial_balance_min: BigDecimal,
    pub initial_balance_max: BigDecimal,
    pub min_txn_amount: BigDecimal,
    pub max_txn_amount: BigDecimal,
}

impl Default for AmountRanges {
    fn default() -> Self {
        Self {
            initial_balance_min: BigDecimal::new(1_000.into(), 2),
            initial_balance_max: BigDecimal::new(100_000.into(), 2),
            min_txn_amount: BigDecimal::new(100.into(), 2),
            max_txn_amount: BigDecimal::new(100_000.into(), 2),
        }
    }
}

pub struct EntityGenerator {
    rng: StdRng,
    ranges: AmountRanges,
}

impl EntityGenerator {
    /// Seeded generators produce the same sequence on every run.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            ranges: AmountRanges::default(),
        }
    }

    pub fn with_ranges(mut self, ranges: AmountRanges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn customer(&mut self) -> NewCustomer {
        let first_name: String = FirstName().fake_with_rng(&mut self.rng);
        let last_name: String = LastName().fake_with_rng(&mut self.rng);
        let suffix: u16 = self.rng.gen_range(1000..=9999);
        let email = format!(
            "{}.{}.{}@{}",
            email_part(&first_name),
            email_part(&last_name),
            suffix,
            EMAIL_DOMAIN
        );

        NewCustomer {
            first_name,
            last_name,
            email,
        }
    }

    pub fn account(&mut self, customer_id: i64) -> Result<NewAccount, GenerationError> {
        let account_type = *pick(&mut self.rng, &AccountType::ALL);
        let balance = money::random_money(
            &mut self.rng,
            &self.ranges.initial_balance_min,
            &self.ranges.initial_balance_max,
        )?;

        Ok(NewAccount {
            customer_id,
            account_type,
            balance,
            currency: CURRENCY.to_string(),
        })
    }

    /// Picks the primary and, for transfers, the counterparty from `accounts`.
    ///
    /// A transfer drawn while only one account exists keeps its kind but has no
    /// related account.
    pub fn transaction(&mut self, accounts: &[i64]) -> Result<NewTransaction, GenerationError> {
        let account_id = *accounts
            .choose(&mut self.rng)
            .ok_or(GenerationError::EmptyAccountPool)?;
        let txn_type = *pick(&mut self.rng, &TxnType::ALL);
        let amount = money::random_amount(
            &mut self.rng,
            &self.ranges.min_txn_amount,
            &self.ranges.max_txn_amount,
        )?;

        let related_account_id = if txn_type == TxnType::Transfer && accounts.len() > 1 {
            let others: Vec<i64> = accounts
                .iter()
                .copied()
                .filter(|id| *id != account_id)
                .collect();
            others.choose(&mut self.rng).copied()
        } else {
            None
        };

        Ok(NewTransaction {
            account_id,
            txn_type,
            amount,
            related_account_id,
            status: TxnStatus::Completed,
        })
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    // Only called with the non-empty `ALL` arrays.
    &items[rng.gen_range(0..items.len())]
}

fn email_part(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}
