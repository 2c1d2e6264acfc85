//! Dropslot server binary.

use anyhow::{Context, Result};
use clap::Parser;
use dropslot_core::AppConfig;
use dropslot_server::{create_router, AppState};
use dropslot_storage::Repository;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dropslot - single-use upload slots over HTTP
#[derive(Parser, Debug)]
#[command(name = "dropslotd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "DROPSLOT_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Dropslot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override
    // everything; the defaults alone are a runnable dev setup).
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("DROPSLOT_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    // Initialize the repository and reclaim space before accepting requests.
    let repository = dropslot_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    repository
        .initialize()
        .await
        .context("initial purge pass failed")?;
    repository
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!("Repository initialized");

    let repository: Arc<dyn Repository> = Arc::new(repository);
    let state = AppState::new(config.clone(), repository.clone());

    // Recurring quota purge. The handle cancels the timer when dropped at
    // shutdown; stored files are kept.
    let _purge_handle = dropslot_storage::spawn_purge_task(repository, config.purge.interval());
    tracing::info!(
        interval_secs = config.purge.interval_secs,
        "Purge task spawned"
    );

    // Recurring sweep of expired, never-consumed slots.
    let _cleanup_handle = dropslot_server::spawn_cleanup_task(
        state.slots.clone(),
        dropslot_server::slots::CLEANUP_INTERVAL,
    );
    tracing::info!("Slot cleanup task spawned");

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
