//! # Medlift API Server
//!
//! Binary entry point for the REST service and the battery audit task.

use std::net::IpAddr;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medlift_api::{AppContext, BatteryAuditTask, Config, build_router};
use medlift_persistence::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "medlift-api")]
#[command(about = "Drone fleet and medication load service")]
struct Args {
    /// Bind address, overrides the host part of SERVER_ADDR
    #[arg(long, env = "API_HOST")]
    api_host: Option<IpAddr>,

    /// Bind port, overrides the port part of SERVER_ADDR
    #[arg(long, env = "API_PORT")]
    api_port: Option<u16>,

    /// Battery audit interval in seconds
    #[arg(long)]
    log_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?.with_overrides(
        args.api_host,
        args.api_port,
        args.log_interval,
    )?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(version = medlift_api::VERSION, "Starting Medlift API");

    let ctx = AppContext::builder()
        .with_store(MemoryStore::new())
        .with_config(config.clone())
        .build();

    // Battery audit
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let audit = BatteryAuditTask::new(
        ctx.fleet.clone(),
        config.battery_log_interval,
        config.battery_reset_enabled,
    )
    .spawn(shutdown_rx);

    let app = build_router(ctx);

    // Start server
    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, prefix = %config.api_prefix, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the audit task write its shutdown pass before exiting
    shutdown_tx.send(true)?;
    audit.await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
