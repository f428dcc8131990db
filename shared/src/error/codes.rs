//! Numeric error codes
//!
//! Grouped by range:
//! - 0xxx: general
//! - 4xxx: orders
//! - 6xxx: stock ledger
//! - 8xxx: HR and scores
//! - 9xxx: system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried by command responses and HTTP error bodies
///
/// Serialized as its `u16` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    Success = 0,
    ValidationFailed = 2,
    NotFound = 3,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    /// Order is selesai or dibatalkan
    OrderAlreadyClosed = 4002,
    /// No edge from the current status to the target
    InvalidTransition = 4003,
    PaymentProofRequired = 4004,
    StockAlreadyCommitted = 4005,
    /// Wrong order kind or status for dispatch
    DispatchNotAllowed = 4006,

    // ==================== 6xxx: Stock ====================
    SkuNotFound = 6001,
    SkuAlreadyExists = 6002,
    /// Movement kind and delta sign disagree
    InvalidMovement = 6003,

    // ==================== 8xxx: HR ====================
    /// Punctuality and discipline points cannot be granted by hand
    InvalidPointCategory = 8001,
    ScoreNotFound = 8002,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    /// Local snapshot cache failed
    StorageError = 9002,
    /// Remote store rejected or failed a request
    GatewayError = 9003,
    /// Snapshot failed ledger verification
    StorageCorrupted = 9004,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default message when the caller gives none
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyClosed => "Order is already closed",
            ErrorCode::InvalidTransition => "Status transition is not allowed",
            ErrorCode::PaymentProofRequired => "Payment proof required",
            ErrorCode::StockAlreadyCommitted => "Order stock already committed",
            ErrorCode::DispatchNotAllowed => "Order cannot be dispatched",

            ErrorCode::SkuNotFound => "SKU not found",
            ErrorCode::SkuAlreadyExists => "SKU already registered",
            ErrorCode::InvalidMovement => "Movement kind does not match delta",

            ErrorCode::InvalidPointCategory => "Point category cannot be granted manually",
            ErrorCode::ScoreNotFound => "Score not found",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Snapshot cache error",
            ErrorCode::GatewayError => "Remote store error",
            ErrorCode::StorageCorrupted => "Snapshot ledger does not verify",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that names no error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderAlreadyClosed,
            4003 => ErrorCode::InvalidTransition,
            4004 => ErrorCode::PaymentProofRequired,
            4005 => ErrorCode::StockAlreadyCommitted,
            4006 => ErrorCode::DispatchNotAllowed,

            6001 => ErrorCode::SkuNotFound,
            6002 => ErrorCode::SkuAlreadyExists,
            6003 => ErrorCode::InvalidMovement,

            8001 => ErrorCode::InvalidPointCategory,
            8002 => ErrorCode::ScoreNotFound,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::StorageError,
            9003 => ErrorCode::GatewayError,
            9004 => ErrorCode::StorageCorrupted,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
