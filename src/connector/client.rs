use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use crate::config::Config;

pub const CONNECTOR_NAME: &str = "postgres-connector";
const CONNECTOR_CLASS: &str = "io.debezium.connector.postgresql.PostgresConnector";
const TOPIC_PREFIX: &str = "banking_server";
const TABLE_INCLUDE_LIST: &str = "public.customers,public.accounts,public.transactions";
const PLUGIN_NAME: &str = "pgoutput";
const SLOT_NAME: &str = "banking_slot";
const PUBLICATION_AUTOCREATE_MODE: &str = "filtered";
const DECIMAL_HANDLING_MODE: &str = "double";

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Kafka Connect rejected the connector ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Kafka Connect unreachable after {attempts} attempts")]
    Unreachable { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
}

/// Body of `POST /connectors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorRequest {
    pub name: String,
    pub config: PostgresConnectorConfig,
}

/// Debezium Postgres source settings. Field names are what Kafka Connect expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostgresConnectorConfig {
    #[serde(rename = "connector.class")]
    pub connector_class: String,
    #[serde(rename = "database.hostname")]
    pub database_hostname: String,
    #[serde(rename = "database.port")]
    pub database_port: String,
    #[serde(rename = "database.user")]
    pub database_user: String,
    #[serde(rename = "database.password")]
    pub database_password: String,
    #[serde(rename = "database.dbname")]
    pub database_dbname: String,
    #[serde(rename = "topic.prefix")]
    pub topic_prefix: String,
    #[serde(rename = "table.include.list")]
    pub table_include_list: String,
    #[serde(rename = "plugin.name")]
    pub plugin_name: String,
    #[serde(rename = "slot.name")]
    pub slot_name: String,
    #[serde(rename = "publication.autocreate.mode")]
    pub publication_autocreate_mode: String,
    #[serde(rename = "tombstones.on.delete")]
    pub tombstones_on_delete: String,
    #[serde(rename = "decimal.handling.mode")]
    pub decimal_handling_mode: String,
}

impl ConnectorRequest {
    pub fn for_database(config: &Config) -> Self {
        Self {
            name: CONNECTOR_NAME.to_string(),
            config: PostgresConnectorConfig {
                connector_class: CONNECTOR_CLASS.to_string(),
                database_hostname: config.postgres_host.clone(),
                database_port: config.postgres_port.to_string(),
                database_user: config.postgres_user.clone(),
                database_password: config.postgres_password.clone(),
                database_dbname: config.postgres_db.clone(),
                topic_prefix: TOPIC_PREFIX.to_string(),
                table_include_list: TABLE_INCLUDE_LIST.to_string(),
                plugin_name: PLUGIN_NAME.to_string(),
                slot_name: SLOT_NAME.to_string(),
                publication_autocreate_mode: PUBLICATION_AUTOCREATE_MODE.to_string(),
                tombstones_on_delete: "false".to_string(),
                decimal_handling_mode: DECIMAL_HANDLING_MODE.to_string(),
            },
        }
    }

    /// Copy safe to log.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.config.database_password = "****".to_string();
        masked
    }
}

/// HTTP client for the Kafka Connect management API.
#[derive(Clone)]
pub struct ConnectClient {
    client: Client,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ConnectClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        ConnectClient {
            client,
            base_url,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Creates the connector. An existing connector with the same name counts
    /// as success. Only connection-level failures are retried.
    pub async fn register(&self, request: &ConnectorRequest) -> Result<Registration, ConnectorError> {
        let url = format!("{}/connectors", self.base_url.trim_end_matches('/'));

        for attempt in 1..=self.max_attempts {
            tracing::info!("Attempt {}/{}: Creating connector...", attempt, self.max_attempts);

            let err = match self.client.post(&url).json(request).send().await {
                Ok(response) => return Self::interpret(response).await,
                Err(e) if e.is_connect() || e.is_timeout() => e,
                Err(e) => {
                    tracing::error!("Unexpected request error: {}", e);
                    return Err(ConnectorError::Request(e));
                }
            };

            if attempt < self.max_attempts {
                tracing::warn!(
                    "Connect attempt failed ({}). Retrying in {:?}...",
                    err,
                    self.retry_delay
                );
                sleep(self.retry_delay).await;
            } else {
                tracing::warn!("Connect attempt failed ({}).", err);
            }
        }

        tracing::error!("All connection attempts failed. Could not create connector.");
        Err(ConnectorError::Unreachable {
            attempts: self.max_attempts,
        })
    }

    async fn interpret(response: reqwest::Response) -> Result<Registration, ConnectorError> {
        let status = response.status();
        if status == StatusCode::CREATED {
            tracing::info!("Connector created successfully!");
            Ok(Registration::Created)
        } else if status == StatusCode::CONFLICT {
            tracing::warn!("Connector already exists.");
            Ok(Registration::AlreadyExists)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Failed to create connector ({}): {}", status.as_u16(), body);
            Err(ConnectorError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
