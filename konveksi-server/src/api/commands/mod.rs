//! Command API
//!
//! The only mutating endpoint. Accepted commands answer with the response
//! and the events they produced; rejected ones answer with the error code's
//! HTTP status.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::CommandResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/commands", post(handler::execute))
}
