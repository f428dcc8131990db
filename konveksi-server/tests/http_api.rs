//! HTTP routes driven through the full middleware stack

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode};
use konveksi_server::persistence::MemoryGateway;
use konveksi_server::{Config, ServerState, SnapshotCache};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::inventory::StockCategory;
use shared::ops::{OpsCommand, OpsCommandPayload, TransitionExtra};
use shared::order::OrderStatus;
use std::sync::Arc;
use tower::util::ServiceExt;

async fn app() -> (Router, ServerState) {
    let cache = SnapshotCache::open_in_memory().unwrap();
    let state =
        ServerState::with_services(Config::default(), cache, Arc::new(MemoryGateway::new())).await;
    (konveksi_server::api::build_app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_command(app: &Router, command: &OpsCommand) -> (StatusCode, Value) {
    let request = Request::post("/api/commands")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(command).unwrap()))
        .unwrap();
    send(app, request).await
}

fn register(sku: &str, initial_stock: i64) -> OpsCommand {
    OpsCommand::new(
        "gudang",
        "Gudang",
        OpsCommandPayload::RegisterItem {
            sku: sku.to_string(),
            name: "Celana Chino".to_string(),
            category: StockCategory::FinishedGood,
            unit_cost: Decimal::from(60_000),
            selling_price: Decimal::from(150_000),
            initial_stock,
        },
    )
}

#[tokio::test]
async fn health_reports_empty_start() {
    let (app, _) = app().await;
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sequence"], 0);
    assert_eq!(body["restored_from"]["source"], "empty");
    assert_eq!(body["sync"]["gateway"], "memory");
}

#[tokio::test]
async fn command_then_read_back() {
    let (app, state) = app().await;

    let (status, body) = post_command(&app, &register("CH-32", 6)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["response"]["success"], true);
    assert_eq!(body["data"]["events"].as_array().unwrap().len(), 2);
    assert_eq!(state.manager.current_sequence(), 2);

    let (status, item) = get(&app, "/api/stock/CH-32").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["stock"], 6);

    let (_, ledger) = get(&app, "/api/stock/CH-32/ledger").await;
    let ledger = ledger.as_array().unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0]["kind"], "initial");
    assert_eq!(ledger[0]["stock_after"], 6);

    let (_, raw) = get(&app, "/api/stock?category=raw-material").await;
    assert!(raw.as_array().unwrap().is_empty());

    let (_, verification) = get(&app, "/api/stock/verify").await;
    assert!(verification["breaks"].as_array().unwrap().is_empty());

    let (_, activity) = get(&app, "/api/activity?limit=5").await;
    assert_eq!(activity.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_sku_is_not_found() {
    let (app, _) = app().await;
    let (status, body) = get(&app, "/api/stock/NOPE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
    assert_eq!(body["details"]["sku"], "NOPE");
}

#[tokio::test]
async fn rejected_command_carries_its_id() {
    let (app, state) = app().await;
    let command = OpsCommand::new(
        "admin",
        "Admin",
        OpsCommandPayload::TransitionOrder {
            order_id: "ORD2026030110001".to_string(),
            target: OrderStatus::Selesai,
            extra: TransitionExtra::default(),
        },
    );

    let (status, body) = post_command(&app, &command).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
    assert_eq!(body["details"]["command_id"], command.command_id.as_str());
    assert_eq!(state.manager.current_sequence(), 0);
}

#[tokio::test]
async fn blank_command_id_is_a_validation_error() {
    let (app, state) = app().await;
    let mut command = register("CH-30", 1);
    command.command_id = "  ".to_string();

    let (status, body) = post_command(&app, &command).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert_eq!(state.manager.current_sequence(), 0);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (app, _) = app().await;
    let response = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
