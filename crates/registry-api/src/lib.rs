//! # registry-api
//!
//! HTTP layer for the gift registry built on Axum.
//!
//! Provides the `/ws` WebSocket upgrade, health endpoints, a read-only
//! registry snapshot, CORS and request tracing, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
