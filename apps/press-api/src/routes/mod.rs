//! HTTP routes.
//!
//! | Method | Path            | Handler                     |
//! |--------|-----------------|-----------------------------|
//! | POST   | `/orders`       | [`orders::create_order`]    |
//! | GET    | `/orders/{id}`  | [`orders::get_order`]       |
//! | DELETE | `/orders/{id}`  | [`orders::delete_order`]    |
//! | POST   | `/quote`        | [`quote::quote`]            |
//! | GET    | `/services`     | [`services::list_services`] |
//! | GET    | `/health`       | [`health::health`]          |

pub mod health;
pub mod orders;
pub mod quote;
pub mod services;
