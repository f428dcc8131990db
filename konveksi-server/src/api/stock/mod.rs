//! Stock API
//!
//! Items, per-SKU ledger history and chain verification.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/verify", get(handler::verify))
        .route("/{sku}", get(handler::get_by_sku))
        .route("/{sku}/ledger", get(handler::ledger))
}
