use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{connect, connect_and_migrate, schema};
use crate::router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "trip-planner")]
#[command(about = "Trip planner API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Address to bind, overrides HOST")]
        host: Option<String>,
        #[arg(long, help = "Port to bind, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Migrate => {
            let pool = connect(&config.database).await?;
            let applied = schema::migrate(&pool).await?;
            println!("Applied {} migration(s) to {}", applied, config.database.url);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect_and_migrate(&config.database)
        .await
        .context("failed to open database")?;

    tokio::fs::create_dir_all(&config.uploads.directory)
        .await
        .with_context(|| format!("failed to create {}", config.uploads.directory.display()))?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, pool).context("invalid JWT configuration")?;
    let app = router::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Trip planner API listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
