//! Application builder: wires router, middleware, and state into an Axum
//! app and serves it.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tokio::sync::watch;
use tracing::{info, warn};

use registry_core::error::{AppError, ErrorKind};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the application on `listener` until `shutdown` resolves.
///
/// The realtime engine is shut down before the listener stops. In-flight
/// requests get `server.shutdown_grace_seconds` to finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = state.realtime.clone();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Registry server listening");
    }

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        engine.shutdown();
        let _ = stop_tx.send(true);
    })
    .into_future();

    let deadline = async move {
        if stop_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))
        }
        _ = deadline => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
            Ok(())
        }
    }
}
