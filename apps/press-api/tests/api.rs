//! Router tests, driven in-process through `tower::ServiceExt::oneshot`.

use std::collections::BTreeMap;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use press_api::{build_router, AppState};
use press_core::rules::{LaminationRules, RuleSet, TarpaulinRules};
use press_core::spec::LaminationSize;
use press_core::{Money, ShopZone};
use press_db::{AllocationOptions, Database, DbConfig};

struct TestApp {
    router: Router,
    db: Database,
    tarpaulin_id: String,
    lamination_id: String,
}

async fn setup_with(options: AllocationOptions) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let tarpaulin = db
        .services()
        .insert(
            "Tarpaulin Printing",
            &RuleSet::Tarpaulin(TarpaulinRules {
                base_price: Money::from_cents(2500),
                eyelet_price: Money::from_cents(1000),
                rope_price: Money::from_cents(5000),
                stand_price: Money::from_cents(20000),
            }),
        )
        .await
        .unwrap();

    let mut multipliers = BTreeMap::new();
    multipliers.insert(LaminationSize::IdSize, 1.0);
    let lamination = db
        .services()
        .insert(
            "Lamination",
            &RuleSet::Lamination(LaminationRules {
                base_price: Money::from_cents(2500),
                size_multipliers: multipliers,
            }),
        )
        .await
        .unwrap();

    TestApp {
        router: build_router(AppState::new(db.clone(), options)),
        db,
        tarpaulin_id: tarpaulin.id,
        lamination_id: lamination.id,
    }
}

async fn setup() -> TestApp {
    setup_with(AllocationOptions {
        zone: ShopZone::parse("UTC").unwrap(),
        ..AllocationOptions::default()
    })
    .await
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn checkout_body(app: &TestApp, total_cents: i64) -> Value {
    json!({
        "items": [
            {
                "serviceId": app.tarpaulin_id,
                "serviceType": "tarpaulin",
                "specification": {
                    "serviceType": "tarpaulin",
                    "widthFt": 3,
                    "heightFt": 4,
                    "eyelets": 6,
                    "includeRope": true,
                    "includeStand": false
                },
                "quantity": 1,
                "unitPrice": 41000,
                "amount": 41000
            },
            {
                "serviceId": app.lamination_id,
                "serviceType": "lamination",
                "specification": { "serviceType": "lamination", "size": "ID Size", "quantity": 10 },
                "quantity": 10,
                "unitPrice": 2500,
                "amount": 25000
            }
        ],
        "total": total_cents,
        "discount": 1000,
        "paymentMethod": "cash",
        "paymentStatus": "paid",
        "customerName": "Ana"
    })
}

async fn order_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

// =============================================================================
// POST /orders
// =============================================================================

#[tokio::test]
async fn test_checkout_creates_order() {
    let app = setup().await;

    let checkout = checkout_body(&app, 65000);
    let (status, body) = send(&app.router, "POST", "/orders", Some(checkout)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let order = &body["order"];
    let today = Utc::now().format("%y%m%d").to_string();
    assert_eq!(order["orderNumber"], format!("ORD-{}-0001", today));
    assert_eq!(order["subtotal"], 66000);
    assert_eq!(order["discount"], 1000);
    assert_eq!(order["total"], 65000);
    assert_eq!(order["paymentMethod"], "cash");
    assert_eq!(order["customerName"], "Ana");

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["amount"], 41000);
    assert_eq!(items[0]["specification"]["serviceType"], "tarpaulin");
    assert_eq!(items[1]["unitPrice"], 2500);

    // A second checkout takes the next number
    let checkout = checkout_body(&app, 65000);
    let (status, body) = send(&app.router, "POST", "/orders", Some(checkout)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["orderNumber"], format!("ORD-{}-0002", today));
}

#[tokio::test]
async fn test_checkout_total_mismatch_persists_nothing() {
    let app = setup().await;

    let checkout = checkout_body(&app, 64000);
    let (status, body) = send(&app.router, "POST", "/orders", Some(checkout)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CHECKOUT_MISMATCH");
    assert!(body["message"].as_str().unwrap().contains("total"));

    assert_eq!(order_count(&app.db).await, 0);
}

#[tokio::test]
async fn test_checkout_tampered_line_price() {
    let app = setup().await;

    let mut body = checkout_body(&app, 55000);
    body["items"][0]["unitPrice"] = json!(31000);
    body["items"][0]["amount"] = json!(31000);

    let (status, body) = send(&app.router, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CHECKOUT_MISMATCH");
    assert_eq!(order_count(&app.db).await, 0);
}

#[tokio::test]
async fn test_checkout_unknown_service() {
    let app = setup().await;

    let mut body = checkout_body(&app, 65000);
    body["items"][1]["serviceId"] = json!("no-such-service");

    let (status, body) = send(&app.router, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = setup().await;

    let body = json!({ "items": [], "total": 0, "paymentMethod": "card" });
    let (status, body) = send(&app.router, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_checkout_malformed_specification() {
    let app = setup().await;

    let mut body = checkout_body(&app, 65000);
    body["items"][0]["specification"] = json!({
        "serviceType": "document",
        "paperSize": "A4",
        "paperType": "Plain",
        "copies": 1
    });

    let (status, body) = send(&app.router, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("colorMode"));
}

#[tokio::test]
async fn test_checkout_allocation_failure_is_503() {
    let app = setup_with(AllocationOptions {
        zone: ShopZone::parse("UTC").unwrap(),
        max_attempts: 1,
        ..AllocationOptions::default()
    })
    .await;

    // Today's first number is already taken by a row outside today's count
    let now = Utc::now();
    let yesterday = now - chrono::Duration::days(1);
    sqlx::query(
        "INSERT INTO orders (id, order_number, subtotal_cents, discount_cents, total_cents,
                             payment_method, payment_status, created_at, updated_at)
         VALUES ('taken', ?1, 0, 0, 0, 'cash', 'paid', ?2, ?2)",
    )
    .bind(format!("ORD-{}-0001", now.format("%y%m%d")))
    .bind(yesterday)
    .execute(app.db.pool())
    .await
    .unwrap();

    let checkout = checkout_body(&app, 65000);
    let (status, body) = send(&app.router, "POST", "/orders", Some(checkout)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "ORDER_NUMBER_ALLOCATION_FAILED");
    assert_eq!(order_count(&app.db).await, 1);
}

// =============================================================================
// GET / DELETE /orders/{id}
// =============================================================================

#[tokio::test]
async fn test_get_and_soft_delete_order() {
    let app = setup().await;

    let (_, created) = send(&app.router, "POST", "/orders", Some(checkout_body(&app, 65000))).await;
    let id = created["order"]["id"].as_str().unwrap().to_string();
    let uri = format!("/orders/{}", id);

    let (status, body) = send(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["orderNumber"], created["order"]["orderNumber"]);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The deleted order's number is not reused
    let (_, next) = send(&app.router, "POST", "/orders", Some(checkout_body(&app, 65000))).await;
    assert_ne!(next["order"]["orderNumber"], created["order"]["orderNumber"]);
}

// =============================================================================
// POST /quote, GET /services, GET /health
// =============================================================================

#[tokio::test]
async fn test_quote_tarpaulin() {
    let app = setup().await;

    let body = json!({
        "serviceId": app.tarpaulin_id,
        "specification": {
            "serviceType": "tarpaulin",
            "widthFt": 3,
            "heightFt": 4,
            "eyelets": 6,
            "includeRope": true
        }
    });
    let (status, body) = send(&app.router, "POST", "/quote", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 41000);
    assert_eq!(body["unitPrice"], 41000);
    assert_eq!(body["breakdown"]["areaSqFt"], 12.0);
}

#[tokio::test]
async fn test_quote_wrong_service_type() {
    let app = setup().await;

    let body = json!({
        "serviceId": app.lamination_id,
        "specification": { "serviceType": "standard", "quantity": 1 }
    });
    let (status, body) = send(&app.router, "POST", "/quote", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_services_and_health() {
    let app = setup().await;

    let (status, body) = send(&app.router, "GET", "/services", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Lamination", "Tarpaulin Printing"]);

    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
