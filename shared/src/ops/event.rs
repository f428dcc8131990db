//! Events - immutable facts recorded after command processing

use crate::hr::{AttendanceRecord, PointLogEntry, PrayerRecord, Sanction, ScoreResult};
use crate::inventory::{LedgerEntry, MovementOutcome, StockItem};
use crate::order::{Order, OrderStatus, PaymentProof, Sale};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Event - immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsEvent {
    /// Event unique ID (derived from the sequence)
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    pub sequence: u64,
    /// Entity this event belongs to (SKU, order id, person id)
    pub entity_id: String,
    /// Server timestamp (Unix milliseconds) - authoritative for state evolution
    pub timestamp: i64,
    /// Client timestamp from the command, for audit only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    pub actor_id: String,
    /// Actor name (snapshot for audit)
    pub actor_name: String,
    /// Command that triggered this event
    pub command_id: String,
    pub event_type: OpsEventType,
    pub payload: EventPayload,
}

impl OpsEvent {
    /// Create a new event
    ///
    /// The server timestamp comes from the command metadata so that deciding
    /// the same command against the same state is reproducible.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        entity_id: String,
        actor_id: String,
        actor_name: String,
        command_id: String,
        timestamp: i64,
        client_timestamp: Option<i64>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: format!("evt-{:012}", sequence),
            sequence,
            entity_id,
            timestamp,
            client_timestamp,
            actor_id,
            actor_name,
            command_id,
            event_type: payload.event_type(),
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpsEventType {
    // Stock
    ItemRegistered,
    StockMoved,

    // Orders
    OrderPlaced,
    PaymentProofAttached,
    OrderStatusChanged,
    OrderDispatched,
    SaleRecorded,
    SaleVoided,

    // HR
    AttendanceRecorded,
    PrayerRecorded,
    SanctionIssued,
    PointsGranted,
    ScoreRecomputed,
}

impl std::fmt::Display for OpsEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpsEventType::ItemRegistered => write!(f, "ITEM_REGISTERED"),
            OpsEventType::StockMoved => write!(f, "STOCK_MOVED"),
            OpsEventType::OrderPlaced => write!(f, "ORDER_PLACED"),
            OpsEventType::PaymentProofAttached => write!(f, "PAYMENT_PROOF_ATTACHED"),
            OpsEventType::OrderStatusChanged => write!(f, "ORDER_STATUS_CHANGED"),
            OpsEventType::OrderDispatched => write!(f, "ORDER_DISPATCHED"),
            OpsEventType::SaleRecorded => write!(f, "SALE_RECORDED"),
            OpsEventType::SaleVoided => write!(f, "SALE_VOIDED"),
            OpsEventType::AttendanceRecorded => write!(f, "ATTENDANCE_RECORDED"),
            OpsEventType::PrayerRecorded => write!(f, "PRAYER_RECORDED"),
            OpsEventType::SanctionIssued => write!(f, "SANCTION_ISSUED"),
            OpsEventType::PointsGranted => write!(f, "POINTS_GRANTED"),
            OpsEventType::ScoreRecomputed => write!(f, "SCORE_RECOMPUTED"),
        }
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Stock ==========
    ItemRegistered {
        item: StockItem,
    },
    /// Planned ledger entries (with their stock snapshots) plus per-movement outcomes
    StockMoved {
        entries: Vec<LedgerEntry>,
        #[serde(default)]
        outcomes: Vec<MovementOutcome>,
    },

    // ========== Orders ==========
    OrderPlaced {
        order: Box<Order>,
    },
    PaymentProofAttached {
        order_id: String,
        proof: PaymentProof,
    },
    OrderStatusChanged {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assignee: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimated_completion_date: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    OrderDispatched {
        order_id: String,
        tracking_number: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        courier: Option<String>,
    },
    SaleRecorded {
        sale: Sale,
    },
    SaleVoided {
        sale_id: String,
        order_id: String,
    },

    // ========== HR ==========
    AttendanceRecorded {
        record: AttendanceRecord,
    },
    PrayerRecorded {
        record: PrayerRecord,
    },
    SanctionIssued {
        sanction: Sanction,
    },
    PointsGranted {
        person_id: String,
        entry: PointLogEntry,
    },
    ScoreRecomputed {
        result: ScoreResult,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> OpsEventType {
        match self {
            EventPayload::ItemRegistered { .. } => OpsEventType::ItemRegistered,
            EventPayload::StockMoved { .. } => OpsEventType::StockMoved,
            EventPayload::OrderPlaced { .. } => OpsEventType::OrderPlaced,
            EventPayload::PaymentProofAttached { .. } => OpsEventType::PaymentProofAttached,
            EventPayload::OrderStatusChanged { .. } => OpsEventType::OrderStatusChanged,
            EventPayload::OrderDispatched { .. } => OpsEventType::OrderDispatched,
            EventPayload::SaleRecorded { .. } => OpsEventType::SaleRecorded,
            EventPayload::SaleVoided { .. } => OpsEventType::SaleVoided,
            EventPayload::AttendanceRecorded { .. } => OpsEventType::AttendanceRecorded,
            EventPayload::PrayerRecorded { .. } => OpsEventType::PrayerRecorded,
            EventPayload::SanctionIssued { .. } => OpsEventType::SanctionIssued,
            EventPayload::PointsGranted { .. } => OpsEventType::PointsGranted,
            EventPayload::ScoreRecomputed { .. } => OpsEventType::ScoreRecomputed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_follows_payload() {
        let event = OpsEvent::new(
            7,
            "ORD2026010110001".to_string(),
            "u-1".to_string(),
            "Admin".to_string(),
            "cmd-1".to_string(),
            1_000,
            None,
            EventPayload::SaleVoided {
                sale_id: "SALE-ORD2026010110001".to_string(),
                order_id: "ORD2026010110001".to_string(),
            },
        );
        assert_eq!(event.event_type, OpsEventType::SaleVoided);
        assert_eq!(event.event_id, "evt-000000000007");
        assert_eq!(event.event_type.to_string(), "SALE_VOIDED");
    }

    #[test]
    fn test_payload_tag() {
        let payload = EventPayload::OrderDispatched {
            order_id: "O1".to_string(),
            tracking_number: "JNE123".to_string(),
            courier: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "ORDER_DISPATCHED");
        assert!(json.get("courier").is_none());
    }
}
