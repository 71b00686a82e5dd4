//! # PrintPress API
//!
//! HTTP order intake for the print shop.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Press API Server                                 │
//! │                                                                         │
//! │  Order-entry UI ───► HTTP (8080) ───► routes ───► press-core (verify)  │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                      press-db ───► SQLite               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is built here rather than in `main` so tests can drive it
//! in-process.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(routes::orders::create_order))
        .route(
            "/orders/{id}",
            get(routes::orders::get_order).delete(routes::orders::delete_order),
        )
        .route("/quote", post(routes::quote::quote))
        .route("/services", get(routes::services::list_services))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
