use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::hr::{PerformanceScore, PointLogEntry};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// A score with the history it was computed from
#[derive(Debug, Serialize)]
pub struct ScoreDetail {
    pub score: PerformanceScore,
    pub points: Vec<PointLogEntry>,
}

pub async fn list(State(state): State<ServerState>) -> Json<Vec<PerformanceScore>> {
    Json(state.manager.read(|s| s.scores.values().cloned().collect()))
}

pub async fn get_by_person(
    State(state): State<ServerState>,
    Path(person_id): Path<String>,
) -> AppResult<Json<ScoreDetail>> {
    state
        .manager
        .read(|s| {
            s.scores.get(&person_id).map(|score| ScoreDetail {
                score: score.clone(),
                points: s.point_logs.get(&person_id).cloned().unwrap_or_default(),
            })
        })
        .map(Json)
        .ok_or_else(|| AppError::score_not_found(&person_id))
}
