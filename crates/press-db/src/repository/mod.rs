//! # Repository Module
//!
//! Database repository implementations for PrintPress.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  press-api handler                                                     │
//! │       │                                                                 │
//! │       │  db.services().load_rules(&ids)                                │
//! │       │  db.orders().create_order(&verified, &options)                 │
//! │       ▼                                                                 │
//! │  ServiceRepository              OrderRepository                        │
//! │  ├── insert / get_by_id         ├── count_created_between / exists     │
//! │  ├── list_active / count        ├── create_order (allocation loop)     │
//! │  ├── set_active                 ├── get_by_id / get_by_order_number    │
//! │  └── load_rules                 ├── get_items                          │
//! │                                 └── soft_delete                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ServiceRepository`](service::ServiceRepository) - Service catalog and rule sets
//! - [`OrderRepository`](order::OrderRepository) - Orders, items, order-number allocation

pub mod order;
pub mod service;
