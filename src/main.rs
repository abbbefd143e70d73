// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use roastmate::{api::create_router, config::AppConfig, db, AppState};

#[derive(Parser)]
#[command(name = "roastmate")]
#[command(version, about = "Roast persona chat service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Bind host, overrides ROAST_HOST
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides ROAST_PORT
        #[arg(long)]
        port: Option<u16>,

        /// Use a throwaway in-memory database
        #[arg(long)]
        ephemeral: bool,
    },
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        ephemeral: false,
    }) {
        Command::Migrate => {
            let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
            db::run_migrations(&pool).await?;
            info!("Schema version: {}", db::get_schema_version(&pool).await?);
            Ok(())
        }
        Command::Serve {
            host,
            port,
            ephemeral,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, ephemeral).await
        }
    }
}

async fn serve(config: AppConfig, ephemeral: bool) -> Result<()> {
    info!("Starting Roastmate v{}", env!("CARGO_PKG_VERSION"));
    info!("Model: {}", config.llm.model);

    let pool = if ephemeral {
        info!("Using in-memory database; nothing will persist");
        db::memory_pool().await?
    } else {
        info!("Database: {}", config.database.url);
        let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
        db::run_migrations(&pool).await?;
        pool
    };

    let app_state = Arc::new(AppState::build(&config, pool)?);
    let app = create_router(app_state, &config.server.cors_origin);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}/api", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
