//! Order lifecycle
//!
//! - **lifecycle**: status graph, proof preconditions, stock commit point,
//!   sale and movement builders
//!
//! Orders are mutated only through the command engine in [`crate::ops`];
//! this module holds the rules it enforces.

pub mod lifecycle;

pub use lifecycle::{
    LifecycleError, LifecycleResult, allowed_targets, check_dispatch, check_transition,
    commits_stock, required_proof, transition,
};
