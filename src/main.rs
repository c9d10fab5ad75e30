use clap::Parser;
use tracing_subscriber::EnvFilter;

use trip_planner_api::cli::{self, Cli};
use trip_planner_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting trip planner API in {:?} mode", config.environment);

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
