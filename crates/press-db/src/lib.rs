//! # press-db: Database Layer for PrintPress POS
//!
//! This crate provides database access for the PrintPress backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PrintPress Data Flow                              │
//! │                                                                         │
//! │  press-api handler (POST /orders)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     press-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ServiceRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │              │  │   │
//! │  │   │ WAL + busy    │    │  (allocation) │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │       SQLite Database (orders.order_number UNIQUE)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Service catalog and order repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use press_db::{AllocationOptions, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/press.db")).await?;
//!
//! let rules = db.services().load_rules(&service_ids).await?;
//! let verified = request.verify(&rules)?;
//! let created = db.orders().create_order(&verified, &AllocationOptions::default()).await?;
//! println!("{}", created.order.order_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::{AllocationOptions, CreatedOrder, OrderRepository};
pub use repository::service::ServiceRepository;
