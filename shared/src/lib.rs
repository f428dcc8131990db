//! Shared types for the garment operations core
//!
//! Domain types used by the server and by every client that talks to it:
//! inventory, orders, HR logs, activity entries, the command/event
//! envelopes, the unified error system and the persistence envelope.

pub mod activity;
pub mod error;
pub mod gateway;
pub mod hr;
pub mod inventory;
pub mod ops;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use ops::{EventPayload, OpsCommand, OpsCommandPayload, OpsEvent, OpsEventType};
