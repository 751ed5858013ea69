use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoclark_core::{
    load_config, validate_config, AvailabilityChecker, CommandRetriever, Config, JobStager,
    PollLoop, RedmineTracker, Retriever, SanitizedConfig, SeenLedger, SlurmSubmitter,
    SqliteSeenLedger, Submitter, TicketProcessor, Tracker,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("AUTOCLARK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    let config_json = serde_json::to_string(&sanitized).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded"
    );
    info!(config = %config_json, "Effective configuration");

    let poll_loop = Arc::new(build_poll_loop(&config)?);

    let runner = Arc::clone(&poll_loop);
    let handle = tokio::spawn(async move { runner.run().await });

    shutdown_signal().await;
    info!("Shutdown signal received");

    poll_loop.stop();
    handle.await.context("Poll loop task failed")?;

    info!("autoclark stopped");
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let json = std::env::var("AUTOCLARK_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_poll_loop(config: &Config) -> Result<PollLoop> {
    let tracker: Arc<dyn Tracker> = Arc::new(
        RedmineTracker::new(config.tracker.clone()).context("Failed to create tracker client")?,
    );
    info!("Using tracker {} at {}", tracker.name(), config.tracker.url);

    let ledger: Arc<dyn SeenLedger> = Arc::new(
        SqliteSeenLedger::new(&config.database.path).context("Failed to open seen ledger")?,
    );
    info!("Seen ledger at {:?}", config.database.path);

    let retriever: Arc<dyn Retriever> = Arc::new(CommandRetriever::new(config.retrieval.clone()));
    let submitter: Arc<dyn Submitter> = Arc::new(SlurmSubmitter::new(config.scheduler.clone()));
    info!(
        "Using retriever {} and submitter {} ({})",
        retriever.name(),
        submitter.name(),
        config.scheduler.submit_program
    );

    let stager = JobStager::new(config.staging.clone(), config.job.clone(), retriever)
        .with_strict_retrieval(config.retrieval.fail_on_nonzero_exit);
    let processor = TicketProcessor::new(
        config.request.clone(),
        stager,
        AvailabilityChecker::new(config.availability.clone()),
        submitter,
    );

    Ok(PollLoop::new(
        config.poller.clone(),
        tracker,
        ledger,
        Arc::new(processor),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
