//! Operations core - command processing over one aggregate
//!
//! # Architecture
//!
//! ```text
//! OpsCommand ──► CommandAction ──► Vec<OpsEvent> ──► EventAction ──► OpsState
//!                 (decide)                            (evolve)
//! ```
//!
//! - **traits**: handler/applier contracts, `OpsError`, command context
//! - **actions**: one handler per command type
//! - **appliers**: one applier per event type
//! - **engine**: pure `decide` / `evolve` / `apply` / `replay`
//! - **manager**: mutex-guarded single writer with idempotency and broadcast
//! - **state**: the aggregate

pub mod traits;

pub mod actions;
pub mod appliers;
pub mod engine;
pub mod manager;
pub mod state;

pub use engine::{apply, decide, evolve, replay};
pub use manager::{ManagerError, ManagerResult, OpsManager};
pub use state::{OpsState, PersonLogs};
pub use traits::{CommandMetadata, OpsError, OpsResult};
