//! HTTP API
//!
//! Reads come straight from the manager's state; every mutation goes
//! through `POST /api/commands`.
//!
//! - [`health`] - liveness, sequence and sync state
//! - [`commands`] - command execution
//! - [`stock`] - items, ledger and chain verification
//! - [`orders`] - orders
//! - [`sales`] - sales
//! - [`scores`] - performance scores and point history
//! - [`activity`] - recent activity

pub mod activity;
pub mod commands;
pub mod health;
pub mod orders;
pub mod sales;
pub mod scores;
pub mod stock;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests served at once; the rest wait
const MAX_IN_FLIGHT_REQUESTS: usize = 100;

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP access log
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Every route, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(commands::router())
        .merge(stock::router())
        .merge(orders::router())
        .merge(sales::router())
        .merge(scores::router())
        .merge(activity::router())
}

/// Router with middleware and state, ready to serve
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), XRequestId))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(log_request))
            .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(PropagateRequestIdLayer::new(request_id)),
    )
}
