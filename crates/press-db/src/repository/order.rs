//! # Order Repository
//!
//! Orders, their line items, and order-number allocation.
//!
//! ## Allocation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  create_order(verified, options)                        │
//! │                                                                         │
//! │  1. day window for `now` in the shop zone                              │
//! │  2. count_today = orders created in the window (soft-deleted included) │
//! │  3. plan = [ORD-YYMMDD-{count+1}, then -RRR suffixes...]               │
//! │                                                                         │
//! │  for candidate in plan:                                                │
//! │     exists(candidate)?  ── yes ──► next candidate                      │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │     BEGIN                                                              │
//! │       INSERT orders (UNIQUE order_number)                              │
//! │       INSERT order_items...                                            │
//! │     COMMIT  ── UNIQUE violation ──► rollback, next candidate           │
//! │        │ ok                                                             │
//! │        ▼                                                                │
//! │     return CreatedOrder                                                │
//! │                                                                         │
//! │  plan exhausted or deadline ──► AllocationFailed, nothing persisted    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `exists` pre-check only saves a round trip; correctness comes from
//! the UNIQUE constraint, which loses the race cleanly for every writer but
//! one.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult, ORDER_NUMBER_CONSTRAINT};
use press_core::order_number::DEFAULT_MAX_ATTEMPTS;
use press_core::{
    AllocationPlan, Order, OrderItem, ServiceSpecification, ServiceType, ShopZone,
    VerifiedCheckout,
};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, customer_name, \
     subtotal_cents, discount_cents, total_cents, payment_method, payment_status, \
     created_at, updated_at, deleted_at";

// =============================================================================
// Allocation Options
// =============================================================================

/// Knobs for order-number allocation.
#[derive(Debug, Clone, Copy)]
pub struct AllocationOptions {
    /// Zone that decides which calendar day "today" is.
    pub zone: ShopZone,
    /// Candidates tried before giving up (sequential + suffixes).
    pub max_attempts: u32,
    /// Deadline for starting another candidate. A candidate whose
    /// transaction has begun is never cut short.
    pub timeout: Duration,
    /// Check `exists` before each insert. Off, every collision is caught by
    /// the UNIQUE constraint alone.
    pub precheck: bool,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        AllocationOptions {
            zone: ShopZone::Local,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_secs(5),
            precheck: true,
        }
    }
}

/// A freshly persisted order.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// 1 when the sequential number was free.
    pub attempts: u32,
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    service_id: String,
    service_type: ServiceType,
    specification_json: String,
    quantity: i64,
    unit_price_cents: i64,
    amount_cents: i64,
    created_at: DateTime<Utc>,
}

impl OrderItemRow {
    fn into_item(self) -> DbResult<OrderItem> {
        let specification: ServiceSpecification = serde_json::from_str(&self.specification_json)
            .map_err(|e| {
                DbError::Internal(format!(
                    "order item {} has an unreadable specification: {}",
                    self.id, e
                ))
            })?;

        Ok(OrderItem {
            id: self.id,
            order_id: self.order_id,
            service_id: self.service_id,
            service_type: self.service_type,
            specification,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            amount_cents: self.amount_cents,
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Counts orders created in `[start, end)`, soft-deleted ones included:
    /// their numbers stay taken.
    pub async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Whether any order, deleted or not, holds this number.
    pub async fn exists(&self, order_number: &str) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM orders WHERE order_number = ?1 LIMIT 1")
                .bind(order_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Persists a verified checkout under a freshly allocated order number.
    pub async fn create_order(
        &self,
        checkout: &VerifiedCheckout,
        options: &AllocationOptions,
    ) -> DbResult<CreatedOrder> {
        self.create_order_at(checkout, options, Utc::now()).await
    }

    /// [`create_order`](Self::create_order) with an explicit clock.
    pub async fn create_order_at(
        &self,
        checkout: &VerifiedCheckout,
        options: &AllocationOptions,
        now: DateTime<Utc>,
    ) -> DbResult<CreatedOrder> {
        let deadline = Instant::now() + options.timeout;

        let window = options.zone.day_window(now);
        let count_today = self.count_created_between(window.start, window.end).await?;

        // The thread RNG is !Send; it lives only for this statement.
        let plan = AllocationPlan::new(
            window.date,
            u64::try_from(count_today).unwrap_or(0),
            options.max_attempts,
            &mut rand::thread_rng(),
        );

        debug!(
            date = %window.date_part(),
            count_today,
            planned = plan.len(),
            "Allocating order number"
        );

        self.insert_first_free(checkout, plan, now, options, deadline).await
    }

    /// Walks the plan until one candidate commits.
    ///
    /// The deadline is only checked before a candidate's transaction
    /// begins. A started transaction always runs to its end, so a committed
    /// order is never reported as a failed allocation.
    async fn insert_first_free(
        &self,
        checkout: &VerifiedCheckout,
        plan: AllocationPlan,
        now: DateTime<Utc>,
        options: &AllocationOptions,
        deadline: Instant,
    ) -> DbResult<CreatedOrder> {
        let mut attempts: u32 = 0;

        for candidate in plan {
            if Instant::now() >= deadline {
                return Err(allocation_timed_out(attempts, options.timeout));
            }
            attempts += 1;
            let order_number = candidate.to_string();

            if options.precheck {
                match tokio::time::timeout_at(deadline, self.exists(&order_number)).await {
                    Ok(taken) => {
                        if taken? {
                            warn!(
                                order_number = %order_number,
                                attempt = attempts,
                                "Order number taken, retrying"
                            );
                            continue;
                        }
                    }
                    Err(_) => return Err(allocation_timed_out(attempts, options.timeout)),
                }
            }

            match self.insert_order(checkout, &order_number, now).await {
                Ok((order, items)) => {
                    info!(
                        id = %order.id,
                        order_number = %order.order_number,
                        total_cents = order.total_cents,
                        items = items.len(),
                        attempt = attempts,
                        "Order created"
                    );
                    return Ok(CreatedOrder {
                        order,
                        items,
                        attempts,
                    });
                }
                Err(err) if err.is_unique_violation_on(ORDER_NUMBER_CONSTRAINT) => {
                    warn!(
                        order_number = %order_number,
                        attempt = attempts,
                        "Lost order number race, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        warn!(attempts, "Every order number candidate was taken");
        Err(DbError::AllocationFailed { attempts })
    }

    /// Inserts the order and its items in one transaction.
    async fn insert_order(
        &self,
        checkout: &VerifiedCheckout,
        order_number: &str,
        now: DateTime<Utc>,
    ) -> DbResult<(Order, Vec<OrderItem>)> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: order_number.to_string(),
            customer_id: checkout.customer_id.clone(),
            customer_name: checkout.customer_name.clone(),
            subtotal_cents: checkout.subtotal.cents(),
            discount_cents: checkout.discount.cents(),
            total_cents: checkout.total.cents(),
            payment_method: checkout.payment_method,
            payment_status: checkout.payment_status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, customer_name,
                subtotal_cents, discount_cents, total_cents,
                payment_method, payment_status,
                created_at, updated_at, deleted_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(checkout.lines.len());
        for line in &checkout.lines {
            let specification_json = serde_json::to_string(&line.specification)
                .map_err(|e| DbError::Internal(e.to_string()))?;

            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                service_id: line.service_id.clone(),
                service_type: line.service_type,
                specification: line.specification.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                amount_cents: line.amount.cents(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, service_id, service_type, specification_json,
                    quantity, unit_price_cents, amount_cents, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.service_id)
            .bind(item.service_type)
            .bind(&specification_json)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.amount_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        Ok((order, items))
    }

    /// Gets a live (not soft-deleted) order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = ?1 AND deleted_at IS NULL",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets a live order by its printed number.
    pub async fn get_by_order_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE order_number = ?1 AND deleted_at IS NULL",
            ORDER_COLUMNS
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets the items of an order in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, service_id, service_type, specification_json,
                   quantity, unit_price_cents, amount_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderItemRow::into_item).collect()
    }

    /// Soft-deletes an order. Returns false if it was missing or already
    /// deleted. The number stays reserved.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE orders SET deleted_at = ?1, updated_at = ?1
            WHERE id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(id = %id, "Order soft-deleted");
        }
        Ok(deleted)
    }
}

fn allocation_timed_out(attempts: u32, timeout: Duration) -> DbError {
    warn!(
        attempts,
        timeout_ms = timeout.as_millis() as u64,
        "Order number allocation timed out"
    );
    DbError::AllocationFailed { attempts }
}

// =============================================================================
// Unit Tests
// =============================================================================
