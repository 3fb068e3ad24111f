//! Route definitions for the registry HTTP surface.
//!
//! The WebSocket endpoint lives at `/ws`; everything else is mounted
//! under `/api`.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, without middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(registry_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .with_state(state)
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Read-only registry snapshot
fn registry_routes() -> Router<AppState> {
    Router::new().route("/registry", get(handlers::registry::snapshot))
}
