//! Stock ledger
//!
//! - **book**: arena store of items plus the append-only ledger
//! - **replay**: stock derivation and chain verification from the ledger

pub mod book;
pub mod replay;

pub use book::{LedgerError, MovementPlan, MovementReport, MovementStamp, StockBook};
pub use replay::{ChainVerification, rebuild_stock, verify_chain};
