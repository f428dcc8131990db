use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::inventory::{LedgerEntry, StockCategory, StockItem};

use crate::core::ServerState;
use crate::inventory::ChainVerification;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<StockCategory>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<StockItem>> {
    let items: Vec<StockItem> = state.manager.read(|s| {
        s.stock
            .items()
            .iter()
            .filter(|item| query.category.is_none_or(|c| item.category == c))
            .cloned()
            .collect()
    });
    Json(items)
}

pub async fn verify(State(state): State<ServerState>) -> Json<ChainVerification> {
    Json(state.manager.verify_ledger())
}

pub async fn get_by_sku(
    State(state): State<ServerState>,
    Path(sku): Path<String>,
) -> AppResult<Json<StockItem>> {
    state
        .manager
        .read(|s| s.stock.item(&sku).cloned())
        .map(Json)
        .ok_or_else(|| AppError::sku_not_found(&sku))
}

pub async fn ledger(
    State(state): State<ServerState>,
    Path(sku): Path<String>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    state
        .manager
        .read(|s| {
            s.stock
                .contains(&sku)
                .then(|| s.stock.entries_for(&sku).cloned().collect::<Vec<_>>())
        })
        .map(Json)
        .ok_or_else(|| AppError::sku_not_found(&sku))
}
