//! Order snapshot - current state of one order
//!
//! `status` always equals the status of the last `history` entry. The
//! history is append-only and never truncated.

use super::types::{Customer, OrderItem, OrderKind, PaymentProof, ProofKind, ShippingInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order status
///
/// Standard flow: `pending_payment → pending_gudang → approved_gudang →
/// siap_kirim → diterima_kurir → selesai`.
/// Pre-order flow: `pending_dp → in_production → pending_payment_remaining →
/// ready_to_ship | ready_for_pickup → selesai`.
/// `dibatalkan` is reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    // Standard
    PendingPayment,
    PendingGudang,
    ApprovedGudang,
    SiapKirim,
    DiterimaKurir,

    // Pre-order
    PendingDp,
    InProduction,
    PendingPaymentRemaining,
    ReadyToShip,
    ReadyForPickup,

    // Terminal
    Selesai,
    Dibatalkan,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Selesai | OrderStatus::Dibatalkan)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::PendingGudang => "pending_gudang",
            OrderStatus::ApprovedGudang => "approved_gudang",
            OrderStatus::SiapKirim => "siap_kirim",
            OrderStatus::DiterimaKurir => "diterima_kurir",
            OrderStatus::PendingDp => "pending_dp",
            OrderStatus::InProduction => "in_production",
            OrderStatus::PendingPaymentRemaining => "pending_payment_remaining",
            OrderStatus::ReadyToShip => "ready_to_ship",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Selesai => "selesai",
            OrderStatus::Dibatalkan => "dibatalkan",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: OrderStatus,
    /// Unix milliseconds
    pub timestamp: i64,
    pub actor: String,
}

/// Order snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub created_at: i64,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub kind: OrderKind,
    #[serde(default)]
    pub shipping: ShippingInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub proofs: Vec<PaymentProof>,
    pub status: OrderStatus,
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<NaiveDate>,
    /// Items have left (or are reserved out of) stock exactly once
    #[serde(default)]
    pub stock_committed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Order {
    /// Status a new order of this kind starts in
    pub fn initial_status(kind: &OrderKind) -> OrderStatus {
        match kind {
            OrderKind::Standard => OrderStatus::PendingPayment,
            OrderKind::PreOrder { .. } => OrderStatus::PendingDp,
        }
    }

    /// Create an order with its first history entry
    pub fn new(
        id: String,
        created_at: i64,
        customer: Customer,
        items: Vec<OrderItem>,
        kind: OrderKind,
        actor: impl Into<String>,
    ) -> Self {
        let status = Self::initial_status(&kind);
        Self {
            id,
            created_at,
            customer,
            items,
            kind,
            shipping: ShippingInfo::default(),
            payment_method: None,
            proofs: Vec::new(),
            status,
            history: vec![HistoryEntry {
                status,
                timestamp: created_at,
                actor: actor.into(),
            }],
            assignee: None,
            estimated_completion_date: None,
            stock_committed: false,
            sale_id: None,
            note: None,
        }
    }

    /// Append a status change
    ///
    /// Unconditional: callers validate the edge first. The timestamp is
    /// clamped so history stays non-decreasing.
    pub fn record_status(&mut self, status: OrderStatus, timestamp: i64, actor: impl Into<String>) {
        let last = self.history.last().map(|h| h.timestamp).unwrap_or(timestamp);
        self.history.push(HistoryEntry {
            status,
            timestamp: timestamp.max(last),
            actor: actor.into(),
        });
        self.status = status;
    }

    pub fn has_proof(&self, kind: ProofKind) -> bool {
        self.proofs.iter().any(|p| p.kind == kind)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn subtotal(&self) -> Option<rust_decimal::Decimal> {
        super::types::subtotal(&self.items)
    }
}
