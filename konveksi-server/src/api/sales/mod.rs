//! Sales API

use axum::{Json, Router, extract::State, routing::get};
use shared::order::Sale;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sales", get(list))
}

/// Recorded and voided sales
async fn list(State(state): State<ServerState>) -> Json<Vec<Sale>> {
    Json(state.manager.read(|s| s.sales.values().cloned().collect()))
}
