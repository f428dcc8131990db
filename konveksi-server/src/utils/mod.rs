//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] (from `shared::error`)
//! - Logging setup

pub mod error;
pub mod logger;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use error::{command_error, ok};
