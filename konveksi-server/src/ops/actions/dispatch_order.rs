//! DispatchOrder command handler
//!
//! The stock commit point of a standard order: `approved_gudang →
//! siap_kirim` with a tracking number. Emits, in order, the outbound-sale
//! ledger entries, the completed sale, the shipping details and the status
//! change.

use super::stock_moved;
use crate::ops::traits::{CommandContext, CommandHandler, CommandMetadata, OpsResult};
use crate::orders::lifecycle;
use shared::inventory::BatchMode;
use shared::order::OrderStatus;
use shared::{EventPayload, OpsEvent};

/// DispatchOrder action
#[derive(Debug, Clone)]
pub struct DispatchOrderAction {
    pub order_id: String,
    pub tracking_number: String,
    pub courier: Option<String>,
}

impl CommandHandler for DispatchOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        let order = ctx.load_order(&self.order_id)?;
        lifecycle::check_dispatch(order, &self.tracking_number)?;

        let plan = ctx.state().stock.plan_movements(
            &lifecycle::sale_movements(order),
            BatchMode::AllOrNothing,
            &ctx.stamp(metadata),
        )?;
        let sale = lifecycle::build_sale(order, metadata.timestamp, &metadata.actor_id)?;

        let moved = stock_moved(ctx, metadata, &order.id, plan);
        let recorded = ctx.event(metadata, &order.id, EventPayload::SaleRecorded { sale });
        let dispatched = ctx.event(
            metadata,
            &order.id,
            EventPayload::OrderDispatched {
                order_id: order.id.clone(),
                tracking_number: self.tracking_number.trim().to_string(),
                courier: self.courier.clone(),
            },
        );
        let changed = ctx.event(
            metadata,
            &order.id,
            EventPayload::OrderStatusChanged {
                order_id: order.id.clone(),
                from: order.status,
                to: OrderStatus::SiapKirim,
                assignee: None,
                estimated_completion_date: None,
                reason: None,
            },
        );

        Ok(vec![moved, recorded, dispatched, changed])
    }
}
