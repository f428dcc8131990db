use axum::{Json, extract::State};
use serde::Serialize;
use shared::ops::{CommandResponse, OpsCommand};
use shared::OpsEvent;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, command_error, ok};

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub response: CommandResponse,
    pub events: Vec<OpsEvent>,
}

pub async fn execute(
    State(state): State<ServerState>,
    Json(cmd): Json<OpsCommand>,
) -> AppResult<Json<ApiResponse<CommandResult>>> {
    if cmd.command_id.trim().is_empty() {
        return Err(AppError::validation("command_id is required"));
    }

    let (response, events) = state.manager.execute_command_with_events(cmd);
    if let Some(error) = command_error(&response) {
        return Err(error);
    }
    Ok(ok(CommandResult { response, events }))
}
