use bank_feeder::cli::{self, Cli, Commands};
use bank_feeder::config::Config;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    match cli.into_command() {
        Commands::Feed(args) => {
            if let Err(e) = cli::handle_feed(&config, &args).await {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::RegisterConnector => {
            if let Err(e) = cli::handle_register_connector(&config).await {
                tracing::error!("Connector setup failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Config => cli::handle_config_validate(&config)?,
    }

    Ok(())
}
