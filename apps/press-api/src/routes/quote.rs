//! Display pricing.
//!
//! The UI asks for a quote while the cashier edits a line. The same
//! calculator re-prices the line at checkout, so a quote is only ever
//! advisory.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::warn;
use ts_rs::TS;

use press_core::{price, CoreError, PriceResult, ServiceSpecification};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub service_id: String,
    pub specification: ServiceSpecification,
}

pub async fn quote(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Json<PriceResult>> {
    let Json(request) = payload?;

    let rules = state
        .db
        .services()
        .load_rules(&[request.service_id.as_str()])
        .await?;
    let rule_set = rules
        .get(&request.service_id)
        .ok_or_else(|| CoreError::UnknownService(request.service_id.clone()))?;

    let result = price(&request.specification, rule_set)?;

    for miss in &result.lookup_misses {
        warn!(
            service_id = %request.service_id,
            table = ?miss.table,
            key = %miss.key,
            "Rule lookup miss, priced with neutral default"
        );
    }

    Ok(Json(result))
}
