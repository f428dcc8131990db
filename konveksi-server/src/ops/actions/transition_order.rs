//! TransitionOrder command handler
//!
//! Moves an order along one edge of its lifecycle. Two edges touch stock:
//!
//! - pre-order into `selesai`: items leave stock and the sale is recorded
//! - any order into `dibatalkan` after its stock was committed: items come
//!   back as `inbound-return` entries and the sale is voided
//!
//! Ledger movements are planned all-or-nothing before any event is built,
//! so a pre-order naming an unregistered SKU fails here instead of
//! completing with missing stock entries.

use super::stock_moved;
use crate::ops::traits::{CommandContext, CommandHandler, CommandMetadata, OpsResult};
use crate::orders::lifecycle;
use shared::inventory::BatchMode;
use shared::ops::TransitionExtra;
use shared::order::OrderStatus;
use shared::{EventPayload, OpsEvent};

/// TransitionOrder action
#[derive(Debug, Clone)]
pub struct TransitionOrderAction {
    pub order_id: String,
    pub target: OrderStatus,
    pub extra: TransitionExtra,
}

impl CommandHandler for TransitionOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        // 1. Load and validate the edge
        let order = ctx.load_order(&self.order_id)?;
        lifecycle::check_transition(order, self.target)?;

        let book = &ctx.state().stock;
        let stamp = ctx.stamp(metadata);
        let mut events = Vec::new();

        // 2. Stock side effects
        if self.target == OrderStatus::Dibatalkan && order.stock_committed {
            let plan = book.plan_movements(
                &lifecycle::return_movements(order),
                BatchMode::AllOrNothing,
                &stamp,
            )?;
            events.push(stock_moved(ctx, metadata, &order.id, plan));
            if let Some(sale_id) = &order.sale_id {
                events.push(ctx.event(
                    metadata,
                    &order.id,
                    EventPayload::SaleVoided {
                        sale_id: sale_id.clone(),
                        order_id: order.id.clone(),
                    },
                ));
            }
        } else if lifecycle::commits_stock(&order.kind, self.target) {
            let plan = book.plan_movements(
                &lifecycle::sale_movements(order),
                BatchMode::AllOrNothing,
                &stamp,
            )?;
            let sale = lifecycle::build_sale(order, metadata.timestamp, &metadata.actor_id)?;
            events.push(stock_moved(ctx, metadata, &order.id, plan));
            events.push(ctx.event(metadata, &order.id, EventPayload::SaleRecorded { sale }));
        }

        // 3. Status change
        events.push(ctx.event(
            metadata,
            &order.id,
            EventPayload::OrderStatusChanged {
                order_id: order.id.clone(),
                from: order.status,
                to: self.target,
                assignee: self.extra.assignee.clone(),
                estimated_completion_date: self.extra.estimated_completion_date,
                reason: self.extra.reason.clone(),
            },
        ));

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::LedgerError;
    use crate::ops::actions::test_support::{metadata, stocked_state};
    use crate::ops::state::OpsState;
    use crate::ops::traits::OpsError;
    use crate::orders::LifecycleError;
    use crate::score::ScoreRules;
    use rust_decimal::Decimal;
    use shared::order::{
        Customer, Order, OrderItem, OrderKind, PaymentProof, ProofKind, Sale,
    };

    const ORDER_ID: &str = "ORD2026030210001";

    fn state_with(kind: OrderKind, status: OrderStatus, sku: &str) -> OpsState {
        let mut state = stocked_state(&[("FG-1", 10)]);
        let mut order = Order::new(
            ORDER_ID.to_string(),
            0,
            Customer {
                name: "A".to_string(),
                phone: None,
                address: None,
            },
            vec![OrderItem {
                sku: sku.to_string(),
                name: "Item".to_string(),
                quantity: 4,
                unit_price: Decimal::from(25),
            }],
            kind,
            "u",
        );
        order.status = status;
        for proof in [ProofKind::Full, ProofKind::Deposit, ProofKind::Remaining] {
            order.proofs.push(PaymentProof {
                kind: proof,
                reference: "r".to_string(),
                amount: Decimal::ONE,
                attached_at: 0,
                attached_by: "u".to_string(),
            });
        }
        state.orders.insert(order.id.clone(), order);
        state
    }

    fn pre_order() -> OrderKind {
        OrderKind::PreOrder {
            deposit: Decimal::from(10),
            remaining_balance: Decimal::from(90),
        }
    }

    fn run(state: &OpsState, target: OrderStatus) -> OpsResult<Vec<OpsEvent>> {
        let rules = ScoreRules::default();
        let mut ctx = CommandContext::new(state, &rules);
        TransitionOrderAction {
            order_id: ORDER_ID.to_string(),
            target,
            extra: TransitionExtra::default(),
        }
        .execute(&mut ctx, &metadata())
    }

    fn types(events: &[OpsEvent]) -> Vec<String> {
        events.iter().map(|e| e.event_type.to_string()).collect()
    }

    #[test]
    fn test_informational_transition() {
        let state = state_with(OrderKind::Standard, OrderStatus::PendingPayment, "FG-1");
        let events = run(&state, OrderStatus::PendingGudang).unwrap();
        assert_eq!(types(&events), vec!["ORDER_STATUS_CHANGED"]);
    }

    #[test]
    fn test_pre_order_completion_commits_stock() {
        let state = state_with(pre_order(), OrderStatus::ReadyForPickup, "FG-1");
        let events = run(&state, OrderStatus::Selesai).unwrap();
        assert_eq!(
            types(&events),
            vec!["STOCK_MOVED", "SALE_RECORDED", "ORDER_STATUS_CHANGED"]
        );
        match &events[0].payload {
            EventPayload::StockMoved { entries, .. } => {
                assert_eq!(entries[0].delta, -4);
                assert_eq!(entries[0].stock_after, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
        // sequences are contiguous within one command
        let seqs: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_pre_order_completion_with_unknown_sku() {
        let state = state_with(pre_order(), OrderStatus::ReadyToShip, "FG-NOT-YET");
        let err = run(&state, OrderStatus::Selesai).unwrap_err();
        assert_eq!(
            err,
            OpsError::Ledger(LedgerError::UnknownSku(vec!["FG-NOT-YET".to_string()]))
        );
    }

    #[test]
    fn test_cancel_after_commit_restores_stock() {
        let mut state = state_with(OrderKind::Standard, OrderStatus::SiapKirim, "FG-1");
        if let Some(order) = state.orders.get_mut(ORDER_ID) {
            order.stock_committed = true;
            order.sale_id = Some(Sale::id_for(ORDER_ID));
        }
        let events = run(&state, OrderStatus::Dibatalkan).unwrap();
        assert_eq!(
            types(&events),
            vec!["STOCK_MOVED", "SALE_VOIDED", "ORDER_STATUS_CHANGED"]
        );
        match &events[0].payload {
            EventPayload::StockMoved { entries, .. } => {
                assert_eq!(entries[0].delta, 4);
                assert_eq!(entries[0].stock_after, 14);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cancel_before_commit_moves_nothing() {
        let state = state_with(OrderKind::Standard, OrderStatus::ApprovedGudang, "FG-1");
        let events = run(&state, OrderStatus::Dibatalkan).unwrap();
        assert_eq!(types(&events), vec!["ORDER_STATUS_CHANGED"]);
    }

    #[test]
    fn test_direct_siap_kirim_is_rejected() {
        let state = state_with(OrderKind::Standard, OrderStatus::ApprovedGudang, "FG-1");
        assert!(matches!(
            run(&state, OrderStatus::SiapKirim),
            Err(OpsError::Lifecycle(LifecycleError::InvalidTransition { .. }))
        ));
    }
}
