//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use registry_core::config::AppConfig;
use registry_database::Stores;
use registry_realtime::RealtimeEngine;
use registry_service::Services;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Stores and the optional database pool
    pub stores: Stores,
    /// Business services
    pub services: Services,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(
        config: Arc<AppConfig>,
        stores: Stores,
        services: Services,
        realtime: Arc<RealtimeEngine>,
    ) -> Self {
        Self {
            config,
            stores,
            services,
            realtime,
            started_at: Instant::now(),
        }
    }
}
