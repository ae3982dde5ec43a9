use sqlx::{PgConnection, Result};
use crate::domain::{NewAccount, NewCustomer, NewTransaction};

// Ids are cast so both SERIAL and BIGSERIAL schemas decode as i64.

pub async fn insert_customer(conn: &mut PgConnection, customer: &NewCustomer) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO customers (first_name, last_name, email)
        VALUES ($1, $2, $3)
        RETURNING id::BIGINT
        "#
    )
    .bind(&customer.first_name)
    .bind(&customer.last_name)
    .bind(&customer.email)
    .fetch_one(&mut *conn)
    .await
}

pub async fn insert_account(conn: &mut PgConnection, account: &NewAccount) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO accounts (customer_id, account_type, balance, currency)
        VALUES ($1, $2, $3, $4)
        RETURNING id::BIGINT
        "#
    )
    .bind(account.customer_id)
    .bind(account.account_type.as_str())
    .bind(&account.balance)
    .bind(&account.currency)
    .fetch_one(&mut *conn)
    .await
}

pub async fn insert_transaction(conn: &mut PgConnection, txn: &NewTransaction) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO transactions (account_id, txn_type, amount, related_account_id, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id::BIGINT
        "#
    )
    .bind(txn.account_id)
    .bind(txn.txn_type.as_str())
    .bind(&txn.amount)
    .bind(txn.related_account_id)
    .bind(txn.status.as_str())
    .fetch_one(&mut *conn)
    .await
}
