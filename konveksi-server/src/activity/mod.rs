//! Activity log
//!
//! - **log**: capped, serializable trail kept inside the aggregate snapshot
//! - **describe**: one entry per command, mirrored to the `audit` target

pub mod describe;
pub mod log;

pub use describe::{AUDIT_TARGET, mirror, summarize};
pub use log::ActivityLog;
