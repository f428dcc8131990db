//! Shared types for orders, payment proofs and sales

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Order Kind
// ============================================================================

/// Standard order or deposit-backed pre-order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OrderKind {
    #[default]
    Standard,
    PreOrder {
        deposit: Decimal,
        remaining_balance: Decimal,
    },
}

impl OrderKind {
    pub fn is_pre_order(&self) -> bool {
        matches!(self, OrderKind::PreOrder { .. })
    }
}

// ============================================================================
// Customer / Shipping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Customer {
    #[validate(length(min = 1, message = "customer name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShippingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

// ============================================================================
// Items
// ============================================================================

/// Order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[validate(length(min = 1, message = "sku is required"))]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `None` when the amount does not fit a `Decimal`
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of `quantity × unit_price` over all lines, `None` on overflow
pub fn subtotal(items: &[OrderItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}

// ============================================================================
// Payment Proofs
// ============================================================================

/// What a payment proof pays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Full payment of a standard order
    Full,
    /// Pre-order down payment
    Deposit,
    /// Pre-order remaining balance
    Remaining,
}

impl std::fmt::Display for ProofKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofKind::Full => write!(f, "full"),
            ProofKind::Deposit => write!(f, "deposit"),
            ProofKind::Remaining => write!(f, "remaining"),
        }
    }
}

/// Bank transfer / payment receipt attached to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub kind: ProofKind,
    /// Transfer reference or uploaded file key
    pub reference: String,
    pub amount: Decimal,
    pub attached_at: i64,
    pub attached_by: String,
}

// ============================================================================
// Sales
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Voided,
}

/// Finalized sale created when an order's stock is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub order_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub created_at: i64,
    pub actor_id: String,
    pub status: SaleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voided_at: Option<i64>,
}

impl Sale {
    /// Sale ids are derived from the order so a sale can never be created twice
    pub fn id_for(order_id: &str) -> String {
        format!("SALE-{}", order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(sku: &str, quantity: i64, price: &str) -> OrderItem {
        OrderItem {
            sku: sku.to_string(),
            name: sku.to_string(),
            quantity,
            unit_price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_subtotal() {
        let items = vec![item("FG-1", 2, "85000"), item("FG-2", 3, "12500.50")];
        assert_eq!(subtotal(&items), Some(Decimal::from_str("207501.50").unwrap()));
        assert_eq!(subtotal(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_subtotal_overflow() {
        let huge = item("FG-1", i64::MAX, "100000000000000000000");
        assert_eq!(huge.line_total(), None);
        assert_eq!(subtotal(&[item("FG-2", 1, "1"), huge]), None);

        let max = OrderItem {
            unit_price: Decimal::MAX,
            ..item("FG-3", 1, "0")
        };
        assert_eq!(max.line_total(), Some(Decimal::MAX));
        assert_eq!(subtotal(&[max.clone(), max]), None);
    }

    #[test]
    fn test_item_validation() {
        assert!(item("FG-1", 1, "1").validate().is_ok());
        assert!(item("FG-1", 0, "1").validate().is_err());
        assert!(item("", 1, "1").validate().is_err());
    }

    #[test]
    fn test_order_kind_tagged() {
        let kind = OrderKind::PreOrder {
            deposit: Decimal::from(50_000),
            remaining_balance: Decimal::from(150_000),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "pre-order");
        assert!(kind.is_pre_order());

        let standard: OrderKind = serde_json::from_str(r#"{"type":"standard"}"#).unwrap();
        assert_eq!(standard, OrderKind::Standard);
    }

    #[test]
    fn test_sale_id() {
        assert_eq!(Sale::id_for("ORD2026010110001"), "SALE-ORD2026010110001");
    }
}
