//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics before traffic arrives
//! - Start the config watcher when hot reload is requested
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, ConfigError, ConfigWatcher, GatewayConfig};
use crate::http::{BuildError, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build gateway: {0}")]
    Build(#[from] BuildError),
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error("config watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Config file. Built-in defaults are used when absent.
    pub config: Option<PathBuf>,
    /// Reload routes, auth and response headers when the file changes.
    pub watch: bool,
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn launch(options: LaunchOptions) -> Result<(), StartupError> {
    let config = match &options.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "meownest starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        auth_enabled = config.auth.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config.clone())?;

    // Holds the notify handle and, without watching, the idle sender.
    let (_watch_guard, updates) = match (&options.config, options.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (WatchGuard::Watcher(watcher.run()?), updates)
        }
        (None, true) => {
            tracing::warn!("--watch has no effect without a config file");
            idle_updates()
        }
        _ => idle_updates(),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, updates, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[allow(dead_code)]
enum WatchGuard {
    Watcher(notify::RecommendedWatcher),
    Idle(mpsc::UnboundedSender<GatewayConfig>),
}

fn idle_updates() -> (WatchGuard, mpsc::UnboundedReceiver<GatewayConfig>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WatchGuard::Idle(tx), rx)
}
