use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unstall_core::{
    load_config, validate_config, ArrClient, Config, Monitor, MonitoredService, QBittorrentClient,
    TorrentClient,
};
use unstall_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into());

    // UNSTALL_LOG_FORMAT=json switches to structured output for log shippers.
    let json = std::env::var("UNSTALL_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wire the qBittorrent client and one *arr client per service into a monitor.
fn build_monitor(config: &Config, torrent_client: Arc<dyn TorrentClient>) -> Result<Monitor> {
    let services = config
        .services
        .iter()
        .map(|svc| {
            let client = ArrClient::new(svc.timeout_secs)
                .with_context(|| format!("Failed to create client for service '{}'", svc.name))?;
            let service = MonitoredService::from_config(svc, Arc::new(client));
            info!(
                "Monitoring category '{}' via {} at {} ({} removal)",
                service.category,
                service.name,
                service.endpoint.url,
                service.kind.as_str()
            );
            Ok(service)
        })
        .collect::<Result<Vec<_>>>()?;

    if services.is_empty() {
        warn!("No services configured, nothing will be monitored");
    }

    Ok(Monitor::new(config.monitor.clone(), torrent_client, services))
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("UNSTALL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    match config.monitor.min_download_speed_kbps {
        Some(floor) => info!("Minimum download speed: {} kB/s", floor),
        None => info!("No minimum download speed configured"),
    }

    // Create torrent client
    info!("Initializing qBittorrent client at {}", config.qbittorrent.url);
    let torrent_client: Arc<dyn TorrentClient> = Arc::new(
        QBittorrentClient::new(config.qbittorrent.clone())
            .context("Failed to create qBittorrent client")?,
    );

    // Create monitor
    let monitor = Arc::new(build_monitor(&config, Arc::clone(&torrent_client))?);
    if config.monitor.enabled {
        monitor.start().await;
    } else {
        info!("Periodic monitoring disabled (cycles can still be triggered via the API)");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Some(Arc::clone(&monitor))));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    if monitor.is_running() {
        monitor.stop().await;
    }

    if let Err(e) = torrent_client.logout().await {
        warn!("Failed to log out of {}: {}", torrent_client.name(), e);
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
