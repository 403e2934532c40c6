//! pprofit - Main Entry Point
//! Serves the control API and supervises the viewer processes it launches

mod browser;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{Config, LogFormat};
use pprofit_api_http::{AppState, HttpServer};
use pprofit_core::application::{
    shutdown_channel, ProcessSupervisor, ProfileService, ShutdownSender, ViewerConfig,
};
use pprofit_core::port::time_provider::SystemTimeProvider;
use pprofit_infra_fs::{DataLayout, FsArtifactStore};
use pprofit_infra_http::HttpFetcher;
use pprofit_infra_system::{OutputMode, SubprocessLauncher};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // 1. Initialize logging
    init_logging(config.log_format)?;
    info!("pprofit v{} starting...", VERSION);

    // 2. Create the data directories (fatal on failure)
    let layout = DataLayout::new(config.data_dir());
    layout
        .create()
        .with_context(|| format!("failed to create {}", layout.profiles_dir().display()))?;
    info!(profiles_dir = %layout.profiles_dir().display(), "Using profile store");

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(FsArtifactStore::new(layout.profiles_dir(), time_provider));
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout())?);
    let launcher = Arc::new(SubprocessLauncher::new(OutputMode::Inherit));

    let supervisor = Arc::new(
        ProcessSupervisor::new(store.clone(), launcher, ViewerConfig::go(&config.go_bin))
            .with_liveness_window(config.liveness_window()),
    );
    let profiles = Arc::new(ProfileService::new(store, fetcher));

    // 4. Bind the control API
    let listen = config.listen()?;
    let server = HttpServer::bind(&listen, AppState::new(profiles, supervisor.clone())).await?;
    let url = format!("http://{}:{}/", listen.host, server.local_addr()?.port());
    info!(url = %url, "Listening");
    info!("Point pprofit-ctl at this server with PPROFIT_URL={}", url);

    // 5. Ctrl+C handling
    let (shutdown_tx, shutdown_token) = shutdown_channel();
    tokio::spawn(handle_interrupts(shutdown_tx));

    if !config.no_browser {
        tokio::spawn(browser::open_browser(url));
    }

    // 6. Serve until the first interrupt, then clean up viewers
    if let Err(e) = server.serve(shutdown_token).await {
        error!(error = %e, "Failed to run server");
    }

    supervisor.shutdown().await;
    info!("Shutdown complete.");

    Ok(())
}

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("pprofit=info,tower_http=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()?;
        }
    }

    Ok(())
}

/// First interrupt: graceful shutdown. Second interrupt: exit immediately.
async fn handle_interrupts(shutdown_tx: ShutdownSender) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for interrupts");
        return;
    }
    info!("Shutdown signal received. Exiting gracefully...");
    shutdown_tx.shutdown();

    if tokio::signal::ctrl_c().await.is_ok() {
        error!("Forcibly shutting down! Background processes may not have been killed.");
        std::process::exit(1);
    }
}
