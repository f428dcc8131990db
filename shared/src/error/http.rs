//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::OrderNotFound | Self::SkuNotFound | Self::ScoreNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::SkuAlreadyExists | Self::OrderAlreadyClosed | Self::StockAlreadyCommitted => {
                StatusCode::CONFLICT
            }

            // The state machine refused the request
            Self::InvalidTransition | Self::PaymentProofRequired | Self::DispatchNotAllowed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // Retryable
            Self::GatewayError => StatusCode::SERVICE_UNAVAILABLE,

            Self::InternalError | Self::StorageError | Self::StorageCorrupted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Self::ValidationFailed | Self::InvalidMovement | Self::InvalidPointCategory => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::SkuNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ScoreNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_state_machine_status() {
        assert_eq!(
            ErrorCode::InvalidTransition.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::StockAlreadyCommitted.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidMovement.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidPointCategory.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::StorageCorrupted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::GatewayError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
