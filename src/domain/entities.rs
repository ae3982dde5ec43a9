//! Row attribute sets for the banking schema.
//! Identities are assigned by the store; these types only carry what gets inserted.

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::fmt;

/// Currency used for every account in a run.
pub const CURRENCY: &str = "USD";

pub const NUM_CUSTOMERS: usize = 10;
pub const ACCOUNTS_PER_CUSTOMER: usize = 2;
pub const NUM_TRANSACTIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub customer_id: i64,
    pub account_type: AccountType,
    pub balance: BigDecimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTransaction {
    pub account_id: i64,
    pub txn_type: TxnType,
    pub amount: BigDecimal,
    /// Set only for transfers, and only when another account was available.
    pub related_account_id: Option<i64>,
    pub status: TxnStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Checking,
}

impl AccountType {
    pub const ALL: [AccountType; 2] = [AccountType::Savings, AccountType::Checking];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Checking => "CHECKING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TxnType {
    pub const ALL: [TxnType; 3] = [TxnType::Deposit, TxnType::Withdrawal, TxnType::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Deposit => "DEPOSIT",
            TxnType::Withdrawal => "WITHDRAWAL",
            TxnType::Transfer => "TRANSFER",
        }
    }
}

/// Every generated transaction is stored as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnStatus {
    Completed,
}

impl TxnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnStatus::Completed => "COMPLETED",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ident),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_display!(AccountType, TxnType, TxnStatus);

/// How many rows one iteration inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub customers: usize,
    pub accounts_per_customer: usize,
    pub transactions: usize,
}

impl Default for BatchCounts {
    fn default() -> Self {
        Self {
            customers: NUM_CUSTOMERS,
            accounts_per_customer: ACCOUNTS_PER_CUSTOMER,
            transactions: NUM_TRANSACTIONS,
        }
    }
}

/// Rows written by a committed iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub customers: usize,
    pub accounts: usize,
    pub transactions: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} customers, {} accounts, and {} transactions",
            self.customers, self.accounts, self.transactions
        )
    }
}
