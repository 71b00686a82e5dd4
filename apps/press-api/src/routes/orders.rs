//! Order intake.
//!
//! ## Checkout Flow
//! ```text
//! POST /orders
//!     │
//!     ├── parse body (400 on malformed JSON / specification)
//!     ├── load rule sets for every referenced service (active only)
//!     ├── CheckoutRequest::verify ── re-price every line, check totals
//!     │       └── 400 / 404 before anything is written
//!     ├── OrderRepository::create_order ── allocate number, insert atomically
//!     │       └── 503 when no number could be claimed
//!     └── 201 { order, items }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use press_core::{CheckoutRequest, Order, OrderItem};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// An order with its lines.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let Json(request) = payload?;

    let rules = {
        let service_ids: Vec<&str> = request
            .items
            .iter()
            .map(|line| line.service_id.as_str())
            .collect();
        state.db.services().load_rules(&service_ids).await?
    };

    let verified = request.verify(&rules)?;
    for miss in &verified.lookup_misses {
        warn!(
            table = ?miss.table,
            key = %miss.key,
            "Rule lookup miss during checkout, priced with neutral default"
        );
    }

    let created = state
        .db
        .orders()
        .create_order(&verified, &state.allocation)
        .await?;

    info!(
        order_number = %created.order.order_number,
        total_cents = created.order.total_cents,
        attempts = created.attempts,
        "Checkout complete"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            order: created.order,
            items: created.items,
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let orders = state.db.orders();
    let order = orders
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;
    let items = orders.get_items(&order.id).await?;

    Ok(Json(OrderResponse { order, items }))
}

/// Soft delete. The order disappears from reads but its number is never
/// handed out again.
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.db.orders().soft_delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Order", &id))
    }
}
