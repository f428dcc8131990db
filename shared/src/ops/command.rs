//! Commands - requests to mutate the operations state

use crate::error::ErrorCode;
use crate::hr::{AttendanceRecord, PointCategory, PrayerRecord, Sanction};
use crate::inventory::{BatchMode, Movement, MovementOutcome, StockCategory};
use crate::order::{Customer, OrderItem, OrderKind, OrderStatus, ProofKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsCommand {
    /// Client-generated id, used for idempotency
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    /// Client timestamp (Unix milliseconds), kept for audit only
    pub timestamp: i64,
    pub payload: OpsCommandPayload,
}

impl OpsCommand {
    pub fn new(
        actor_id: impl Into<String>,
        actor_name: impl Into<String>,
        payload: OpsCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.into(),
            actor_name: actor_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpsCommandPayload {
    // ========== Stock ==========
    /// Pre-seed a stock item, optionally with an opening balance
    RegisterItem {
        sku: String,
        name: String,
        category: StockCategory,
        unit_cost: Decimal,
        selling_price: Decimal,
        #[serde(default)]
        initial_stock: i64,
    },
    ApplyMovements {
        movements: Vec<Movement>,
        #[serde(default)]
        mode: BatchMode,
    },
    /// Finished goods received from production; registers the SKU on first receipt
    ReceiveProduction {
        sku: String,
        #[serde(default)]
        name: Option<String>,
        quantity: i64,
        #[serde(default)]
        unit_cost: Option<Decimal>,
        #[serde(default)]
        selling_price: Option<Decimal>,
        #[serde(default)]
        batch_ref: Option<String>,
    },
    RecordReturn {
        sku: String,
        quantity: i64,
        reason: String,
    },
    /// Stock-take: record the counted quantity, the ledger gets the difference
    AdjustStock {
        sku: String,
        counted: i64,
        reason: String,
    },

    // ========== Orders ==========
    Checkout {
        order: CheckoutInput,
    },
    AttachPaymentProof {
        order_id: String,
        kind: ProofKind,
        reference: String,
        amount: Decimal,
    },
    TransitionOrder {
        order_id: String,
        target: OrderStatus,
        #[serde(default)]
        extra: TransitionExtra,
    },
    DispatchOrder {
        order_id: String,
        tracking_number: String,
        #[serde(default)]
        courier: Option<String>,
    },

    // ========== HR ==========
    RecordAttendance {
        record: AttendanceRecord,
    },
    RecordPrayer {
        record: PrayerRecord,
    },
    IssueSanction {
        sanction: Sanction,
    },
    GrantPoints {
        person_id: String,
        grant: PointGrant,
    },
    RecomputeScore {
        person_id: String,
    },
}

/// Checkout form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutInput {
    #[validate(nested)]
    pub customer: Customer,
    #[validate(length(min = 1, message = "order needs at least one item"), nested)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub kind: OrderKind,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Optional data attached to a status transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Largest magnitude a single grant may carry
pub const MAX_GRANT_POINTS: i64 = 10_000;
const MIN_GRANT_POINTS: i64 = -MAX_GRANT_POINTS;

/// Operator-entered point entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PointGrant {
    /// Generated from the command when absent
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    #[validate(range(
        min = MIN_GRANT_POINTS,
        max = MAX_GRANT_POINTS,
        message = "grant is out of range"
    ))]
    pub delta: i64,
    pub category: PointCategory,
    pub reason: String,
}

/// Command error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

/// Command response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub success: bool,
    /// Entity the command created or touched (order id, SKU, person id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
    /// Per-movement results of ledger batches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<MovementOutcome>,
    /// Command id was already processed; nothing changed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl CommandResponse {
    pub fn success(command_id: String, entity_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            entity_id,
            error: None,
            outcomes: Vec::new(),
            duplicate: false,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            entity_id: None,
            error: Some(error),
            outcomes: Vec::new(),
            duplicate: false,
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            entity_id: None,
            error: None,
            outcomes: Vec::new(),
            duplicate: true,
        }
    }

    pub fn with_outcomes(mut self, outcomes: Vec<MovementOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_tagging() {
        let json = r#"{
            "type": "APPLY_MOVEMENTS",
            "movements": [{"sku": "M1", "delta": 100, "kind": "inbound-production"}]
        }"#;
        let payload: OpsCommandPayload = serde_json::from_str(json).unwrap();
        match payload {
            OpsCommandPayload::ApplyMovements { movements, mode } => {
                assert_eq!(movements.len(), 1);
                assert_eq!(mode, BatchMode::BestEffort);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_checkout_validation() {
        let input = CheckoutInput {
            customer: Customer {
                name: String::new(),
                phone: None,
                address: None,
            },
            items: vec![],
            kind: OrderKind::Standard,
            courier: None,
            payment_method: None,
            note: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("customer"));
        assert!(fields.contains_key("items"));
    }

    #[test]
    fn test_grant_delta_is_bounded() {
        let grant = |delta| PointGrant {
            id: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            delta,
            category: PointCategory::Initiative,
            reason: "lembur".to_string(),
        };
        assert!(grant(MAX_GRANT_POINTS).validate().is_ok());
        assert!(grant(-MAX_GRANT_POINTS).validate().is_ok());
        assert!(grant(i64::MAX).validate().is_err());
        assert!(grant(i64::MIN).validate().is_err());
    }

    #[test]
    fn test_response_skips_empty_fields() {
        let resp = CommandResponse::success("cmd-1".to_string(), Some("M1".to_string()));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("outcomes"));
        assert!(!json.contains("duplicate"));
        assert!(!json.contains("error"));

        let dup = CommandResponse::duplicate("cmd-1".to_string());
        assert!(serde_json::to_string(&dup).unwrap().contains("\"duplicate\":true"));
    }
}
