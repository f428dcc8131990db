//! Score API
//!
//! Scores are recomputed inside the HR commands; these routes only read.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub use handler::ScoreDetail;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/scores", get(handler::list))
        .route("/api/scores/{person_id}", get(handler::get_by_person))
}
