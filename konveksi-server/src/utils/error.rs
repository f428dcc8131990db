//! Error types for HTTP handlers
//!
//! Handlers return [`AppResult`]; `AppError` renders as an [`ApiResponse`]
//! with the status its [`ErrorCode`] maps to.

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use axum::Json;
use serde::Serialize;
use shared::ops::CommandResponse;

/// Successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Rejected command as an HTTP error, tagged with its command id
pub fn command_error(response: &CommandResponse) -> Option<AppError> {
    let error = response.error.clone()?;
    Some(AppError::from(error).with_detail("command_id", response.command_id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ops::CommandError;

    #[test]
    fn test_command_error_keeps_code_and_id() {
        let response = CommandResponse::error(
            "cmd-7".to_string(),
            CommandError::new(ErrorCode::InvalidTransition, "pending_payment -> selesai"),
        );
        let err = command_error(&response).unwrap();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.http_status(), http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details.unwrap()["command_id"], "cmd-7");
    }

    #[test]
    fn test_accepted_command_is_not_an_error() {
        let response = CommandResponse::success("cmd-8".to_string(), None);
        assert!(command_error(&response).is_none());
    }
}
