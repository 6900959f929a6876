//! crgate HTTP server binary

use anyhow::Context;
use clap::Parser;
use crgate_core::{AuthMode, ServerConfig};
use crgate_server::{metrics, router, telemetry, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "crgate-server")]
#[command(about = "Change request approval gateway")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CRGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory served for non-API paths
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Authentication backend (mock or directory)
    #[arg(long)]
    auth_mode: Option<AuthMode>,

    /// Fixture file with change requests, metrics and mock accounts
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = dir;
        }
        if let Some(mode) = self.auth_mode {
            config.auth.mode = mode;
        }
        if let Some(path) = self.fixtures {
            config.fixtures = Some(path);
        }
    }
}

fn load_config(args: Args) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args)?;

    let enable_otel = std::env::var("OTEL_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if enable_otel {
        telemetry::init_tracing_stack("crgate-server", config.auth.mode)?;
        info!("OpenTelemetry tracing enabled");
    } else {
        telemetry::init_console_logging()?;
        info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }

    info!("Starting crgate server v{}", env!("CARGO_PKG_VERSION"));

    metrics::init_prometheus()?;
    metrics::init_metrics();

    let state = AppState::from_config(&config)?;
    metrics::set_catalog_entries(state.catalog.len());
    info!(
        auth_mode = state.auth.mode().as_str(),
        change_requests = state.catalog.len(),
        static_dir = %config.static_dir.display(),
        "Application state ready"
    );

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if enable_otel {
        info!("Flushing OpenTelemetry traces...");
        telemetry::shutdown_telemetry();
    }

    info!("Server shutdown complete");
    Ok(())
}
