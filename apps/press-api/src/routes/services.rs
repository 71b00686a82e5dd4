//! Service catalog.

use axum::extract::State;
use axum::Json;

use press_core::Service;

use crate::error::ApiResult;
use crate::state::AppState;

/// Active services with their rule sets, for the order-entry screen.
pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<Service>>> {
    let services = state.db.services().list_active().await?;
    Ok(Json(services))
}
