//! Command / event envelopes
//!
//! - Commands: requests from clients to mutate stock, orders or HR logs
//! - Events: immutable facts recorded after command processing

pub mod command;
pub mod event;

// Re-exports
pub use command::{
    CheckoutInput, CommandError, CommandResponse, OpsCommand, OpsCommandPayload, PointGrant,
    TransitionExtra,
};
pub use event::{EventPayload, OpsEvent, OpsEventType};
