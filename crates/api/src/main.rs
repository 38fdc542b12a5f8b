use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stager_api::background::retention;
use stager_api::config::ServerConfig;
use stager_api::router::build_app_router;
use stager_api::state::AppState;
use stager_events::EventBus;
use stager_hosting::chain::{HostChain, HostSettings};
use stager_hosting::ImageCache;
use stager_pipeline::{InMemoryJobStore, Orchestrator, OrchestratorConfig};
use stager_reimagine::api::ReimagineApi;

/// Timeout for outbound calls to the provider and image hosts.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // --- Tracing ---
    init_tracing(config.log_json);
    tracing::info!(
        host = %config.host,
        port = config.port,
        public_base_url = %config.public_base_url,
        "Loaded server configuration"
    );
    if !config.api_configured() {
        tracing::warn!("REIMAGINEHOME_API_KEY not set, staging requests will be refused");
    }

    let client = match reqwest::Client::builder().timeout(OUTBOUND_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    // --- Image hosting ---
    let image_cache = Arc::new(ImageCache::new());
    let hosts = Arc::new(HostChain::from_kinds(
        &config.image_hosts,
        &HostSettings {
            client: client.clone(),
            cache: Arc::clone(&image_cache),
            public_base_url: config.public_base_url.clone(),
            imgbb_api_key: config.imgbb_api_key.clone(),
        },
    ));
    tracing::info!(hosts = ?hosts.host_names(), "Image host chain ready");

    // --- Orchestrator ---
    let provider = Arc::new(ReimagineApi::with_client(
        client,
        config.reimagine_api_url.clone(),
        config.reimagine_api_key.clone().unwrap_or_default(),
    ));
    let event_bus = Arc::new(EventBus::default());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(InMemoryJobStore::new()),
        provider,
        Arc::clone(&event_bus),
        OrchestratorConfig {
            poll: config.poll_config(),
            public_base_url: config.public_base_url.clone(),
        },
    ));
    tracing::info!("Staging orchestrator started");

    // --- Retention ---
    let retention_cancel = tokio_util::sync::CancellationToken::new();
    let retention_handle = tokio::spawn(retention::run(
        Arc::clone(&orchestrator),
        Arc::clone(&image_cache),
        config.job_retention(),
        retention_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: Arc::clone(&orchestrator),
        hosts,
        image_cache,
        event_bus,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = match config.host.parse() {
        Ok(ip) => SocketAddr::new(ip, config.port),
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            return ExitCode::FAILURE;
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    orchestrator.shutdown().await;

    retention_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Retention job stopped");

    match served {
        Ok(()) => {
            tracing::info!("Graceful shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "stager_api=debug,stager_pipeline=debug,stager_reimagine=info,stager_hosting=info,tower_http=debug"
            .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed, that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
