use crate::ops::traits::OpsError;
use shared::error::ErrorCode;
use shared::ops::CommandError;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error("Snapshot rejected: {0}")]
    CorruptSnapshot(String),
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Ops(e) => e.into(),
            ManagerError::CorruptSnapshot(msg) => {
                tracing::error!(reason = %msg, "Snapshot rejected");
                CommandError::new(ErrorCode::StorageCorrupted, msg)
            }
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
