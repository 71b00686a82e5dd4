//! Shared application state.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  AppState (cloned into every handler)        │
//! │  ├── db: Database          pool, thread-safe │
//! │  └── allocation: options   read-only         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! No pricing table lives here: rule sets are loaded per request from the
//! catalog and passed explicitly to the calculator.

use press_db::{AllocationOptions, Database};

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub allocation: AllocationOptions,
}

impl AppState {
    pub fn new(db: Database, allocation: AllocationOptions) -> Self {
        AppState { db, allocation }
    }
}
