//! Activity log entry types
//!
//! Read-only side channel for reporting; nothing in the core reads it back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    ItemRegistered,
    StockMovement,
    OrderPlaced,
    OrderStatusChanged,
    PaymentProofAttached,
    OrderDispatched,
    SaleRecorded,
    SaleVoided,
    AttendanceRecorded,
    PrayerRecorded,
    SanctionIssued,
    PointsGranted,
    ScoreRecomputed,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityType::ItemRegistered => "item_registered",
            ActivityType::StockMovement => "stock_movement",
            ActivityType::OrderPlaced => "order_placed",
            ActivityType::OrderStatusChanged => "order_status_changed",
            ActivityType::PaymentProofAttached => "payment_proof_attached",
            ActivityType::OrderDispatched => "order_dispatched",
            ActivityType::SaleRecorded => "sale_recorded",
            ActivityType::SaleVoided => "sale_voided",
            ActivityType::AttendanceRecorded => "attendance_recorded",
            ActivityType::PrayerRecorded => "prayer_recorded",
            ActivityType::SanctionIssued => "sanction_issued",
            ActivityType::PointsGranted => "points_granted",
            ActivityType::ScoreRecomputed => "score_recomputed",
        };
        f.write_str(s)
    }
}

/// Immutable activity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    /// Unix milliseconds
    pub timestamp: i64,
    pub actor_id: String,
    pub activity_type: ActivityType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
}
