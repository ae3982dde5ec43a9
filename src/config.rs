use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::error::FeederError;

const REQUIRED_VARS: [&str; 5] = [
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_DB",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
];

const DEFAULT_CONNECT_RETRIES: u32 = 5;
const DEFAULT_CONNECT_RETRY_DELAY_SECS: u64 = 3;
const DEFAULT_FEED_INTERVAL_SECS: u64 = 2;
const DEFAULT_KAFKA_CONNECT_URL: &str = "http://localhost:8083";

#[derive(Debug, Clone)]
pub struct Config {
    pub postgres_host: String,
    pub postgres_port: u16,
    pub postgres_db: String,
    pub postgres_user: String,
    pub postgres_password: String,
    pub connect_retries: u32,
    pub connect_retry_delay: Duration,
    pub feed_interval: Duration,
    pub kafka_connect_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, FeederError> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeederError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(FeederError::MissingConfig(missing.join(", ")));
        }

        let required = |name: &str| get(name).unwrap_or_default();

        Ok(Config {
            postgres_host: required("POSTGRES_HOST"),
            postgres_port: parse_var("POSTGRES_PORT", &required("POSTGRES_PORT"))?,
            postgres_db: required("POSTGRES_DB"),
            postgres_user: required("POSTGRES_USER"),
            postgres_password: required("POSTGRES_PASSWORD"),
            connect_retries: match get("CONNECT_RETRIES") {
                Some(raw) => parse_var("CONNECT_RETRIES", &raw)?,
                None => DEFAULT_CONNECT_RETRIES,
            },
            connect_retry_delay: Duration::from_secs(match get("CONNECT_RETRY_DELAY_SECS") {
                Some(raw) => parse_var("CONNECT_RETRY_DELAY_SECS", &raw)?,
                None => DEFAULT_CONNECT_RETRY_DELAY_SECS,
            }),
            feed_interval: Duration::from_secs(match get("FEED_INTERVAL_SECS") {
                Some(raw) => parse_var("FEED_INTERVAL_SECS", &raw)?,
                None => DEFAULT_FEED_INTERVAL_SECS,
            }),
            kafka_connect_url: get("KAFKA_CONNECT_URL")
                .unwrap_or_else(|| DEFAULT_KAFKA_CONNECT_URL.to_string()),
        })
    }

    /// Connection string with the password masked, for logs.
    pub fn masked_database_url(&self) -> String {
        format!(
            "postgres://{}:****@{}:{}/{}",
            self.postgres_user, self.postgres_host, self.postgres_port, self.postgres_db
        )
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, FeederError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| FeederError::InvalidConfig {
            name: name.to_string(),
            reason: e.to_string(),
        })
}
