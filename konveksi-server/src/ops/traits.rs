//! Command handler / event applier contracts
//!
//! `CommandHandler::execute` reads the aggregate through a
//! [`CommandContext`] and returns the events a command produces, or an
//! [`OpsError`] without touching anything. `EventApplier::apply` folds one
//! event into the aggregate and never fails.

use crate::inventory::{LedgerError, MovementStamp};
use crate::orders::LifecycleError;
use crate::score::ScoreRules;
use enum_dispatch::enum_dispatch;
use shared::error::ErrorCode;
use shared::hr::PointCategory;
use shared::ops::CommandError;
use shared::order::Order;
use shared::{EventPayload, OpsEvent};
use thiserror::Error;

use super::state::OpsState;

/// Domain errors raised while deciding a command
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("SKU not found: {0}")]
    SkuNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Points in {0} are generated from HR logs and cannot be granted")]
    InvalidPointCategory(PointCategory),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl OpsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OpsError::Validation(_) => ErrorCode::ValidationFailed,
            OpsError::SkuNotFound(_) => ErrorCode::SkuNotFound,
            OpsError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            OpsError::InvalidPointCategory(_) => ErrorCode::InvalidPointCategory,
            OpsError::Ledger(e) => match e {
                LedgerError::EmptyBatch => ErrorCode::ValidationFailed,
                LedgerError::UnknownSku(_) => ErrorCode::SkuNotFound,
                LedgerError::DuplicateSku(_) => ErrorCode::SkuAlreadyExists,
                LedgerError::InvalidMovement { .. } | LedgerError::StockOverflow { .. } => {
                    ErrorCode::InvalidMovement
                }
            },
            OpsError::Lifecycle(e) => match e {
                LifecycleError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
                LifecycleError::PaymentProofRequired { .. } => ErrorCode::PaymentProofRequired,
                LifecycleError::OrderClosed(..) => ErrorCode::OrderAlreadyClosed,
                LifecycleError::ProofMismatch { .. } => ErrorCode::ValidationFailed,
                LifecycleError::DispatchNotAllowed { .. } => ErrorCode::DispatchNotAllowed,
                LifecycleError::StockAlreadyCommitted(_) => ErrorCode::StockAlreadyCommitted,
                LifecycleError::AmountOverflow(_) => ErrorCode::ValidationFailed,
            },
        }
    }
}

impl From<validator::ValidationErrors> for OpsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OpsError::Validation(errors.to_string())
    }
}

impl From<OpsError> for CommandError {
    fn from(err: OpsError) -> Self {
        CommandError::new(err.code(), err.to_string())
    }
}

pub type OpsResult<T> = Result<T, OpsError>;

/// Who issued a command and when it is being processed
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    /// Server processing time, stamped on events and ledger entries
    pub timestamp: i64,
    /// Time the client built the command
    pub client_timestamp: Option<i64>,
}

/// Read-only view of the aggregate plus sequence allocation
pub struct CommandContext<'a> {
    state: &'a OpsState,
    rules: &'a ScoreRules,
    sequence: u64,
}

impl<'a> CommandContext<'a> {
    pub fn new(state: &'a OpsState, rules: &'a ScoreRules) -> Self {
        Self {
            state,
            rules,
            sequence: state.sequence,
        }
    }

    pub fn state(&self) -> &'a OpsState {
        self.state
    }

    pub fn rules(&self) -> &'a ScoreRules {
        self.rules
    }

    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn load_order(&self, order_id: &str) -> OpsResult<&'a Order> {
        self.state
            .orders
            .get(order_id)
            .ok_or_else(|| OpsError::OrderNotFound(order_id.to_string()))
    }

    pub fn stamp(&self, metadata: &CommandMetadata) -> MovementStamp {
        MovementStamp::new(metadata.timestamp, metadata.actor_id.clone())
    }

    /// Build the next event of this command
    pub fn event(
        &mut self,
        metadata: &CommandMetadata,
        entity_id: impl Into<String>,
        payload: EventPayload,
    ) -> OpsEvent {
        let seq = self.next_sequence();
        OpsEvent::new(
            seq,
            entity_id.into(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            metadata.timestamp,
            metadata.client_timestamp,
            payload,
        )
    }
}

/// Turns one command into events
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>>;
}

/// Folds one event into the aggregate
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent);
}

/// Reject blank text fields
pub fn require_text(value: &str, field: &str) -> OpsResult<()> {
    if value.trim().is_empty() {
        return Err(OpsError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
