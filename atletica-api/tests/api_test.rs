use atletica_api::{app, AppState};
use atletica_store::{app_config::BusinessRules, InMemoryStore};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), store.clone(), store, &BusinessRules::default()).unwrap();
    app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_product(app: &Router, name: &str, price: i64, stock: i32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/v1/products",
        Some(json!({ "name": name, "unit_price_cents": price, "stock_quantity": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_customer_registration_flow() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/v1/customers",
        Some(json!({ "student_id": "20230001", "name": "Ana Lima", "email": "ana@ufpe.br", "is_member": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_member"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/customers",
        Some(json!({ "student_id": "20230001", "name": "Outra Pessoa" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PUT",
        "/v1/customers/20230001/membership",
        Some(json!({ "is_member": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_member"], true);

    let (status, body) = send(&app, "GET", "/v1/customers/20230001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@ufpe.br");

    let (status, body) = send(&app, "GET", "/v1/customers/99999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("99999999"));

    let (status, _) = send(
        &app,
        "POST",
        "/v1/customers",
        Some(json!({ "student_id": "12", "name": "Ana Lima" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_stock_and_price() {
    let app = test_app();
    let id = create_product(&app, "Caneca", 2_500, 3).await;

    let (status, _) = send(&app, "POST", &format!("/v1/products/{}/stock", id), Some(json!({ "delta": -5 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "POST", &format!("/v1/products/{}/stock", id), Some(json!({ "delta": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_quantity"], 10);

    let (status, _) = send(&app, "PUT", &format!("/v1/products/{}/price", id), Some(json!({ "unit_price_cents": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PUT", &format!("/v1/products/{}/price", id), Some(json!({ "unit_price_cents": 2_990 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit_price"], "R$ 29,90");

    let (status, body) = send(&app, "PATCH", &format!("/v1/products/{}", id), Some(json!({ "low_stock_threshold": 10 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["low_stock"], true);

    let (status, body) = send(&app, "GET", "/v1/products/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_member_checkout_applies_discount() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/v1/customers",
        Some(json!({ "student_id": "20230001", "name": "Ana Lima", "is_member": true })),
    )
    .await;
    let id = create_product(&app, "Camisa", 5_000, 5).await;

    let (status, sale) = send(
        &app,
        "POST",
        "/v1/sales",
        Some(json!({
            "customer_id": "20230001",
            "items": [{ "product_id": id, "quantity": 2 }],
            "payment_method": "dinheiro"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["subtotal_cents"], 10_000);
    assert_eq!(sale["discount_cents"], 1_000);
    assert_eq!(sale["total_amount_cents"], 9_000);
    assert_eq!(sale["payment_method"], "CASH");

    let (_, product) = send(&app, "GET", &format!("/v1/products/{}", id), None).await;
    assert_eq!(product["stock_quantity"], 3);

    let sale_id = sale["id"].as_str().unwrap();
    let (status, stored) = send(&app, "GET", &format!("/v1/sales/{}", sale_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["items"][0]["product_name"], "Camisa");

    let (status, listed) = send(&app, "GET", "/v1/sales?customer=ana", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_rejections_leave_stock_intact() {
    let app = test_app();
    let id = create_product(&app, "Apito", 1_500, 1).await;

    let (status, _) = send(
        &app,
        "POST",
        "/v1/sales",
        Some(json!({ "items": [{ "product_id": id, "quantity": 2 }], "payment_method": "PIX" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/sales",
        Some(json!({ "items": [{ "product_id": id, "quantity": 1 }], "payment_method": "CARD" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, product) = send(&app, "GET", &format!("/v1/products/{}", id), None).await;
    assert_eq!(product["stock_quantity"], 1);

    let (status, _) = send(&app, "GET", "/v1/sales?from=2026-10-10&to=2026-10-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reports_and_blocked_delete() {
    let app = test_app();
    send(&app, "POST", "/v1/customers", Some(json!({ "student_id": "20230001", "name": "Ana Lima", "is_member": true }))).await;
    send(&app, "POST", "/v1/customers", Some(json!({ "student_id": "20230002", "name": "Bruno Costa" }))).await;
    let id = create_product(&app, "Boné", 3_000, 2).await;

    send(
        &app,
        "POST",
        "/v1/sales",
        Some(json!({ "customer_id": "20230002", "items": [{ "product_id": id, "quantity": 1 }], "payment_method": "PIX" })),
    )
    .await;

    let (status, report) = send(&app, "GET", "/v1/reports/membership", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["members"], 1);
    assert_eq!(report["member_percentage"], 50.0);

    let (status, stock) = send(&app, "GET", "/v1/reports/stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["low_stock"][0]["critical"], true);

    let (status, _) = send(&app, "GET", "/v1/reports/stock?threshold=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/v1/products/{}", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", "/v1/customers/20230002", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", "/v1/customers/20230001", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_rejected_product_patch_changes_nothing() {
    let app = test_app();
    let id = create_product(&app, "Squeeze", 1_990, 8).await;
    let uri = format!("/v1/products/{}", id);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "name": "Garrafa", "low_stock_threshold": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, product) = send(&app, "GET", &uri, None).await;
    assert_eq!(product["name"], "Squeeze");
    assert_eq!(product["low_stock_threshold"], 5);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, product) = send(&app, "PATCH", &uri, Some(json!({ "name": "Garrafa", "low_stock_threshold": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Garrafa");
    assert_eq!(product["low_stock_threshold"], 1);
}
