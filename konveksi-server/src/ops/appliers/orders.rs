//! Order and sale event appliers

use crate::ops::state::OpsState;
use crate::ops::traits::EventApplier;
use crate::orders::lifecycle;
use shared::ops::TransitionExtra;
use shared::order::{OrderStatus, SaleStatus};
use shared::{EventPayload, OpsEvent};

/// Log an event that names an order the state does not have
fn missing_order(event: &OpsEvent, order_id: &str) {
    tracing::error!(
        event_id = %event.event_id,
        order_id = %order_id,
        event_type = %event.event_type,
        "Event for unknown order not applied"
    );
}

/// OrderPlaced applier
pub struct OrderPlacedApplier;

impl EventApplier for OrderPlacedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::OrderPlaced { order } = &event.payload {
            state.orders.insert(order.id.clone(), order.as_ref().clone());
            state.order_counter += 1;
        }
    }
}

/// PaymentProofAttached applier
pub struct PaymentProofAttachedApplier;

impl EventApplier for PaymentProofAttachedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::PaymentProofAttached { order_id, proof } = &event.payload {
            match state.orders.get_mut(order_id) {
                Some(order) => order.proofs.push(proof.clone()),
                None => missing_order(event, order_id),
            }
        }
    }
}

/// OrderStatusChanged applier
///
/// Flags the stock commit when the order enters its commit status and
/// clears it when a committed order is cancelled (its stock came back in
/// the same command).
pub struct OrderStatusChangedApplier;

impl EventApplier for OrderStatusChangedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::OrderStatusChanged {
            order_id,
            to,
            assignee,
            estimated_completion_date,
            reason,
            ..
        } = &event.payload
        {
            let Some(order) = state.orders.get_mut(order_id) else {
                missing_order(event, order_id);
                return;
            };
            let extra = TransitionExtra {
                assignee: assignee.clone(),
                estimated_completion_date: *estimated_completion_date,
                reason: reason.clone(),
            };
            lifecycle::apply_transition(order, *to, event.timestamp, &event.actor_id, &extra);

            if lifecycle::commits_stock(&order.kind, *to) {
                order.stock_committed = true;
            } else if *to == OrderStatus::Dibatalkan {
                order.stock_committed = false;
            }
        }
    }
}

/// OrderDispatched applier
pub struct OrderDispatchedApplier;

impl EventApplier for OrderDispatchedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::OrderDispatched {
            order_id,
            tracking_number,
            courier,
        } = &event.payload
        {
            let Some(order) = state.orders.get_mut(order_id) else {
                missing_order(event, order_id);
                return;
            };
            order.shipping.tracking_number = Some(tracking_number.clone());
            if courier.is_some() {
                order.shipping.courier = courier.clone();
            }
        }
    }
}

/// SaleRecorded applier
pub struct SaleRecordedApplier;

impl EventApplier for SaleRecordedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::SaleRecorded { sale } = &event.payload {
            if let Some(order) = state.orders.get_mut(&sale.order_id) {
                order.sale_id = Some(sale.id.clone());
            }
            state.sales.insert(sale.id.clone(), sale.clone());
        }
    }
}

/// SaleVoided applier
pub struct SaleVoidedApplier;

impl EventApplier for SaleVoidedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::SaleVoided { sale_id, .. } = &event.payload {
            match state.sales.get_mut(sale_id) {
                Some(sale) => {
                    sale.status = SaleStatus::Voided;
                    sale.voided_at = Some(event.timestamp);
                }
                None => {
                    tracing::error!(event_id = %event.event_id, sale_id = %sale_id, "SaleVoided for unknown sale");
                }
            }
        }
    }
}
