pub mod entities;
pub mod money;

pub use entities::{
    AccountType, BatchCounts, BatchSummary, NewAccount, NewCustomer, NewTransaction, TxnStatus,
    TxnType,
};
