//! Honeymoon Registry Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use registry_core::config::AppConfig;
use registry_core::error::{AppError, ErrorKind};
use registry_database::Stores;
use registry_realtime::RealtimeEngine;
use registry_service::{AlertService, Services};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let alerts = match AlertService::new(&config.alerts) {
        Ok(a) => Arc::new(a),
        Err(e) => {
            tracing::error!("Alert setup failed: {}", e);
            std::process::exit(1);
        }
    };
    install_panic_alert(alerts.clone());

    if let Err(e) = run(config, alerts.clone()).await {
        tracing::error!(error = %e, source = ?e.source, "Server error");
        alerts
            .notify_logged("Server stopped on error", &format!("{e}\n\n{:?}", e.source))
            .await;
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("REGISTRY_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Email the operator when any thread panics.
fn install_panic_alert(alerts: Arc<AlertService>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        let body = info.to_string();
        tracing::error!(panic = %body, "Panic");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let alerts = alerts.clone();
            handle.spawn(async move {
                alerts.notify_logged("Server panicked", &body).await;
            });
        }
    }));
}

/// Main server run function
async fn run(config: AppConfig, alerts: Arc<AlertService>) -> Result<(), AppError> {
    tracing::info!("Starting Honeymoon Registry v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    tracing::info!(driver = ?config.database.driver, "Opening stores...");
    let stores = Stores::from_config(&config.database).await?;

    // ── Step 2: Payment gateway ──────────────────────────────────
    let gateway = registry_payment::build_gateway(&config.payment)?;
    tracing::info!(gateway = gateway.name(), "Payment gateway ready");

    // ── Step 3: Services ─────────────────────────────────────────
    let services = Services::new(&config, &stores, gateway, alerts);

    // ── Step 4: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), &services));

    // ── Step 5: HTTP server ──────────────────────────────────────
    let bind_address = config.server.bind_address();
    let listener = TcpListener::bind(&bind_address).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("Failed to bind {bind_address}"),
            e,
        )
    })?;

    let state = registry_api::AppState::new(Arc::new(config), stores.clone(), services, realtime);
    let result = registry_api::app::serve(listener, state, async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    })
    .await;

    stores.close().await;
    tracing::info!("Server stopped");
    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
