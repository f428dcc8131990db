//! Activity API

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::activity::ActivityEntry;

use crate::core::ServerState;

const DEFAULT_LIMIT: usize = 50;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/activity", get(recent))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Newest first
async fn recent(
    State(state): State<ServerState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<ActivityEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.manager.read(|s| s.activity.recent(limit)))
}
