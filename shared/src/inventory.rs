//! Inventory types - stock items, ledger entries and movement batches

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Physical inventory category
///
/// Raw materials and finished goods share one SKU namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockCategory {
    RawMaterial,
    FinishedGood,
}

/// Stock item - mutated only through ledger movements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub sku: String,
    pub name: String,
    pub category: StockCategory,
    /// Current stock (may go negative, never clamped)
    pub stock: i64,
    pub unit_cost: Decimal,
    pub selling_price: Decimal,
    /// Registration time (Unix milliseconds)
    pub created_at: i64,
}

/// Ledger movement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    /// Opening balance at registration
    Initial,
    /// Goods received from production
    InboundProduction,
    /// Goods leaving with a sale
    OutboundSale,
    /// Goods taken out by hand (samples, damage, internal use)
    OutboundManual,
    /// Goods coming back (customer return, cancelled shipment)
    InboundReturn,
    /// Stock-take correction
    Adjustment,
}

impl MovementKind {
    /// Whether `delta` has the sign this kind requires
    pub fn accepts(&self, delta: i64) -> bool {
        match self {
            MovementKind::Initial | MovementKind::Adjustment => true,
            MovementKind::InboundProduction | MovementKind::InboundReturn => delta > 0,
            MovementKind::OutboundSale | MovementKind::OutboundManual => delta < 0,
        }
    }

    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            MovementKind::InboundProduction | MovementKind::InboundReturn
        )
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MovementKind::Initial => "initial",
            MovementKind::InboundProduction => "inbound-production",
            MovementKind::OutboundSale => "outbound-sale",
            MovementKind::OutboundManual => "outbound-manual",
            MovementKind::InboundReturn => "inbound-return",
            MovementKind::Adjustment => "adjustment",
        };
        f.write_str(s)
    }
}

/// Immutable ledger record
///
/// For one SKU, in append order, `stock_after` equals the previous entry's
/// `stock_after` plus this entry's `delta` (the first entry starts from 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    /// Unix milliseconds
    pub timestamp: i64,
    pub sku: String,
    /// Item name at the time of the movement
    pub item_name: String,
    pub kind: MovementKind,
    pub delta: i64,
    /// Resulting stock, recorded not recomputed
    pub stock_after: i64,
    pub reason: String,
    pub actor_id: String,
}

/// One requested stock change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub sku: String,
    pub delta: i64,
    pub kind: MovementKind,
    #[serde(default)]
    pub reason: String,
}

impl Movement {
    pub fn new(
        sku: impl Into<String>,
        delta: i64,
        kind: MovementKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            delta,
            kind,
            reason: reason.into(),
        }
    }
}

/// How a multi-item batch treats unknown SKUs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Apply every known SKU, report the unknown ones as skipped
    #[default]
    BestEffort,
    /// Apply nothing unless every SKU is known
    AllOrNothing,
}

/// Per-movement result of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MovementOutcome {
    Applied {
        sku: String,
        entry_id: String,
        stock_after: i64,
    },
    Skipped {
        sku: String,
        reason: String,
    },
}

impl MovementOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MovementOutcome::Applied { .. })
    }

    pub fn sku(&self) -> &str {
        match self {
            MovementOutcome::Applied { sku, .. } | MovementOutcome::Skipped { sku, .. } => sku,
        }
    }
}
