use sqlx::postgres::PgConnectOptions;
use crate::config::Config;

pub mod connection_manager;
pub mod queries;

pub use connection_manager::{ConnectionManager, RetryPolicy};

pub fn connect_options(config: &Config) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.postgres_host)
        .port(config.postgres_port)
        .database(&config.postgres_db)
        .username(&config.postgres_user)
        .password(&config.postgres_password)
}
