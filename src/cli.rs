use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;

use crate::adapters::PgConnector;
use crate::config::Config;
use crate::connector::{ConnectClient, ConnectorRequest, Registration};
use crate::db::{ConnectionManager, RetryPolicy};
use crate::domain::BatchCounts;
use crate::error::FeederError;
use crate::generator::EntityGenerator;
use crate::services::{FeedLoop, IterationRunner, LoopReport, RunMode};

#[derive(Parser, Debug)]
#[command(name = "bank-feeder")]
#[command(about = "Bank Feeder - synthetic banking traffic for CDC pipelines", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub feed: FeedArgs,
}

impl Cli {
    /// Feeding is the default when no subcommand is given.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Feed(self.feed))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate customers, accounts and transactions (default)
    Feed(FeedArgs),

    /// Register the Debezium connector with Kafka Connect
    RegisterConnector,

    /// Configuration validation
    Config,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedArgs {
    /// Run a single iteration and exit
    #[arg(long)]
    pub once: bool,

    /// Optional random seed for deterministic runs (negative values allowed)
    #[arg(long, value_name = "SEED", allow_negative_numbers = true)]
    pub seed: Option<i64>,
}

impl FeedArgs {
    /// Negative seeds keep their bit pattern, so every `i64` is a distinct seed.
    pub fn rng_seed(&self) -> Option<u64> {
        self.seed.map(|seed| seed as u64)
    }

    pub fn mode(&self, config: &Config) -> RunMode {
        if self.once {
            RunMode::Once
        } else {
            RunMode::Continuous {
                interval: config.feed_interval,
            }
        }
    }
}

pub async fn handle_feed(config: &Config, args: &FeedArgs) -> Result<LoopReport, FeederError> {
    tracing::info!("Feeding {}", config.masked_database_url());

    let manager = ConnectionManager::new(PgConnector::new(config), RetryPolicy::from_config(config));
    let runner = IterationRunner::new(EntityGenerator::new(args.rng_seed()), BatchCounts::default());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; stopping after the current iteration");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = FeedLoop::new(manager, runner, args.mode(config), shutdown_rx)
        .run()
        .await?;

    tracing::info!(
        "Feeder stopped ({:?}): {} iterations, {} committed, {} rolled back, {} reconnects",
        report.stop_reason,
        report.iterations,
        report.committed,
        report.rolled_back,
        report.reconnects
    );
    Ok(report)
}

pub async fn handle_register_connector(config: &Config) -> Result<Registration, FeederError> {
    let request = ConnectorRequest::for_database(config);

    tracing::info!("Connector configuration built successfully:");
    if let Ok(pretty) = serde_json::to_string_pretty(&request.masked()) {
        tracing::info!("{}", pretty);
    }

    let registration = ConnectClient::new(config.kafka_connect_url.clone())
        .with_retry(config.connect_retries, config.connect_retry_delay)
        .register(&request)
        .await?;

    println!("✓ Connector setup completed ({:?})", registration);
    Ok(registration)
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Database URL: {}", config.masked_database_url());
    println!(
        "  Connect retries: {} (every {:?})",
        config.connect_retries, config.connect_retry_delay
    );
    println!("  Feed interval: {:?}", config.feed_interval);
    println!("  Kafka Connect URL: {}", config.kafka_connect_url);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}
