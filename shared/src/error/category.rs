//! Error code ranges as categories

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Which part of the system an error code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Order,
    Stock,
    Hr,
    /// Storage, gateway and internal failures; logged when returned over HTTP
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            4000..5000 => Self::Order,
            6000..7000 => Self::Stock,
            8000..9000 => Self::Hr,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Order => "order",
            Self::Stock => "stock",
            Self::Hr => "hr",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
