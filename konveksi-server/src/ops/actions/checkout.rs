//! Checkout command handler
//!
//! Creates an order in its kind's initial status. Standard orders sell from
//! stock and must reference registered SKUs; pre-orders may name SKUs that
//! production has not delivered yet, they are checked when stock is
//! committed.

use crate::inventory::LedgerError;
use crate::ops::traits::{CommandContext, CommandHandler, CommandMetadata, OpsError, OpsResult};
use rust_decimal::Decimal;
use shared::ops::CheckoutInput;
use shared::order::{Order, OrderKind, subtotal};
use shared::util::date_of_millis;
use shared::{EventPayload, OpsEvent};
use validator::Validate;

/// Checkout action
#[derive(Debug, Clone)]
pub struct CheckoutAction {
    pub input: CheckoutInput,
}

impl CheckoutAction {
    fn check_amounts(&self) -> OpsResult<()> {
        if let Some(item) = self.input.items.iter().find(|i| i.unit_price < Decimal::ZERO) {
            return Err(OpsError::Validation(format!(
                "unit_price of {} must not be negative",
                item.sku
            )));
        }
        if let OrderKind::PreOrder {
            deposit,
            remaining_balance,
        } = &self.input.kind
            && (*deposit < Decimal::ZERO || *remaining_balance < Decimal::ZERO)
        {
            return Err(OpsError::Validation(
                "deposit and remaining_balance must not be negative".to_string(),
            ));
        }
        if subtotal(&self.input.items).is_none() {
            return Err(OpsError::Validation("order subtotal is too large".to_string()));
        }
        Ok(())
    }
}

impl CommandHandler for CheckoutAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        // 1. Shape
        self.input.validate()?;
        self.check_amounts()?;

        // 2. SKUs
        let state = ctx.state();
        if !self.input.kind.is_pre_order() {
            let mut missing: Vec<String> = self
                .input
                .items
                .iter()
                .filter(|i| !state.stock.contains(&i.sku))
                .map(|i| i.sku.clone())
                .collect();
            if !missing.is_empty() {
                missing.sort();
                missing.dedup();
                return Err(LedgerError::UnknownSku(missing).into());
            }
        }

        // 3. Fill display names from the catalog
        let items = self
            .input
            .items
            .iter()
            .cloned()
            .map(|mut item| {
                if item.name.trim().is_empty()
                    && let Some(known) = state.stock.item(&item.sku)
                {
                    item.name = known.name.clone();
                }
                item
            })
            .collect();

        // 4. Build the order
        let order_id = state.next_order_id(date_of_millis(metadata.timestamp));
        let mut order = Order::new(
            order_id.clone(),
            metadata.timestamp,
            self.input.customer.clone(),
            items,
            self.input.kind.clone(),
            metadata.actor_id.clone(),
        );
        order.shipping.courier = self.input.courier.clone();
        order.payment_method = self.input.payment_method.clone();
        order.note = self.input.note.clone();

        let event = ctx.event(
            metadata,
            order_id,
            EventPayload::OrderPlaced {
                order: Box::new(order),
            },
        );
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::actions::test_support::{metadata, stocked_state};
    use crate::score::ScoreRules;
    use shared::error::ErrorCode;
    use shared::order::{Customer, OrderItem, OrderStatus};

    fn input(kind: OrderKind, skus: &[&str]) -> CheckoutInput {
        CheckoutInput {
            customer: Customer {
                name: "Bu Rina".to_string(),
                phone: Some("0812".to_string()),
                address: None,
            },
            items: skus
                .iter()
                .map(|sku| OrderItem {
                    sku: sku.to_string(),
                    name: String::new(),
                    quantity: 2,
                    unit_price: Decimal::from(100_000),
                })
                .collect(),
            kind,
            courier: Some("JNE".to_string()),
            payment_method: Some("transfer".to_string()),
            note: None,
        }
    }

    fn run(
        state: &crate::ops::state::OpsState,
        input: CheckoutInput,
    ) -> OpsResult<Vec<OpsEvent>> {
        let rules = ScoreRules::default();
        let mut ctx = CommandContext::new(state, &rules);
        CheckoutAction { input }.execute(&mut ctx, &metadata())
    }

    fn placed(events: &[OpsEvent]) -> &Order {
        match &events[0].payload {
            EventPayload::OrderPlaced { order } => order,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_standard_checkout() {
        let state = stocked_state(&[("FG-1", 5)]);
        let events = run(&state, input(OrderKind::Standard, &["FG-1"])).unwrap();
        let order = placed(&events);
        assert_eq!(order.id, "ORD2026030210001");
        assert_eq!(events[0].entity_id, order.id);
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.items[0].name, "Item FG-1");
        assert_eq!(order.shipping.courier.as_deref(), Some("JNE"));
        assert!(!order.stock_committed);
    }

    #[test]
    fn test_standard_checkout_unknown_sku() {
        let state = stocked_state(&[("FG-1", 5)]);
        let err = run(&state, input(OrderKind::Standard, &["FG-1", "FG-9"])).unwrap_err();
        assert_eq!(err, OpsError::Ledger(LedgerError::UnknownSku(vec!["FG-9".to_string()])));
        assert_eq!(err.code(), ErrorCode::SkuNotFound);
    }

    #[test]
    fn test_pre_order_accepts_future_sku() {
        let state = stocked_state(&[]);
        let kind = OrderKind::PreOrder {
            deposit: Decimal::from(50_000),
            remaining_balance: Decimal::from(150_000),
        };
        let events = run(&state, input(kind, &["FG-SERAGAM-SD"])).unwrap();
        assert_eq!(placed(&events).status, OrderStatus::PendingDp);
    }

    #[test]
    fn test_validation() {
        let state = stocked_state(&[("FG-1", 5)]);
        let mut empty = input(OrderKind::Standard, &[]);
        empty.customer.name = String::new();
        assert!(matches!(run(&state, empty), Err(OpsError::Validation(_))));

        let mut negative = input(OrderKind::Standard, &["FG-1"]);
        negative.items[0].unit_price = Decimal::from(-1);
        assert!(matches!(run(&state, negative), Err(OpsError::Validation(_))));

        let mut zero_qty = input(OrderKind::Standard, &["FG-1"]);
        zero_qty.items[0].quantity = 0;
        assert!(matches!(run(&state, zero_qty), Err(OpsError::Validation(_))));
    }

    #[test]
    fn test_subtotal_must_fit() {
        let state = stocked_state(&[("FG-1", 5)]);
        let mut huge = input(OrderKind::Standard, &["FG-1"]);
        huge.items[0].quantity = i64::MAX;
        huge.items[0].unit_price = Decimal::from(i64::MAX);

        let err = run(&state, huge).unwrap_err();
        assert_eq!(err, OpsError::Validation("order subtotal is too large".to_string()));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
