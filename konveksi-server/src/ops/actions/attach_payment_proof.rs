//! AttachPaymentProof command handler
//!
//! Proofs gate the payment edges of the lifecycle; attaching one never moves
//! the order by itself.

use crate::ops::traits::{
    CommandContext, CommandHandler, CommandMetadata, OpsError, OpsResult, require_text,
};
use crate::orders::lifecycle;
use rust_decimal::Decimal;
use shared::order::{PaymentProof, ProofKind};
use shared::{EventPayload, OpsEvent};

/// AttachPaymentProof action
#[derive(Debug, Clone)]
pub struct AttachPaymentProofAction {
    pub order_id: String,
    pub kind: ProofKind,
    pub reference: String,
    pub amount: Decimal,
}

impl CommandHandler for AttachPaymentProofAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.reference, "reference")?;
        if self.amount < Decimal::ZERO {
            return Err(OpsError::Validation("amount must not be negative".to_string()));
        }

        let order = ctx.load_order(&self.order_id)?;
        lifecycle::check_proof(order, self.kind)?;

        let proof = PaymentProof {
            kind: self.kind,
            reference: self.reference.trim().to_string(),
            amount: self.amount,
            attached_at: metadata.timestamp,
            attached_by: metadata.actor_id.clone(),
        };
        let event = ctx.event(
            metadata,
            &self.order_id,
            EventPayload::PaymentProofAttached {
                order_id: self.order_id.clone(),
                proof,
            },
        );
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::actions::test_support::{metadata, stocked_state};
    use crate::orders::LifecycleError;
    use crate::score::ScoreRules;
    use shared::order::{Customer, Order, OrderItem, OrderKind, OrderStatus};

    fn state_with_order(status: OrderStatus) -> crate::ops::state::OpsState {
        let mut state = stocked_state(&[("FG-1", 3)]);
        let mut order = Order::new(
            "ORD2026030210001".to_string(),
            0,
            Customer {
                name: "A".to_string(),
                phone: None,
                address: None,
            },
            vec![OrderItem {
                sku: "FG-1".to_string(),
                name: "Item".to_string(),
                quantity: 1,
                unit_price: Decimal::from(10),
            }],
            OrderKind::Standard,
            "u",
        );
        order.status = status;
        state.orders.insert(order.id.clone(), order);
        state
    }

    fn attach(state: &crate::ops::state::OpsState, kind: ProofKind) -> OpsResult<Vec<OpsEvent>> {
        let rules = ScoreRules::default();
        let mut ctx = CommandContext::new(state, &rules);
        AttachPaymentProofAction {
            order_id: "ORD2026030210001".to_string(),
            kind,
            reference: "BCA-7781".to_string(),
            amount: Decimal::from(10),
        }
        .execute(&mut ctx, &metadata())
    }

    #[test]
    fn test_attach_full_proof() {
        let state = state_with_order(OrderStatus::PendingPayment);
        let events = attach(&state, ProofKind::Full).unwrap();
        match &events[0].payload {
            EventPayload::PaymentProofAttached { proof, .. } => {
                assert_eq!(proof.attached_by, "u-1");
                assert_eq!(proof.kind, ProofKind::Full);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wrong_kind_and_closed_order() {
        let state = state_with_order(OrderStatus::PendingPayment);
        assert!(matches!(
            attach(&state, ProofKind::Deposit),
            Err(OpsError::Lifecycle(LifecycleError::ProofMismatch { .. }))
        ));

        let state = state_with_order(OrderStatus::Dibatalkan);
        assert!(matches!(
            attach(&state, ProofKind::Full),
            Err(OpsError::Lifecycle(LifecycleError::OrderClosed(..)))
        ));
    }

    #[test]
    fn test_unknown_order() {
        let state = stocked_state(&[]);
        assert_eq!(
            attach(&state, ProofKind::Full).unwrap_err(),
            OpsError::OrderNotFound("ORD2026030210001".to_string())
        );
    }
}
