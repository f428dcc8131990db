//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::order::{Order, OrderStatus};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Orders, oldest id first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Order>> {
    let orders: Vec<Order> = state.manager.read(|s| {
        s.orders_with_status(query.status)
            .into_iter()
            .cloned()
            .collect()
    });
    Json(orders)
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    state
        .manager
        .read(|s| s.orders.get(&id).cloned())
        .map(Json)
        .ok_or_else(|| AppError::order_not_found(&id))
}
