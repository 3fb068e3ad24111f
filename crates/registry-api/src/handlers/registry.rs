//! Read-only registry handlers.

use axum::Json;
use axum::extract::State;

use registry_entity::registry::RegistryItemView;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/registry
///
/// The same snapshot a visitor receives on `CONNECTION_OPENED`.
pub async fn snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RegistryItemView>>>, ApiError> {
    let registry = state.services.registry.snapshot().await?;
    Ok(Json(ApiResponse::ok(registry)))
}
