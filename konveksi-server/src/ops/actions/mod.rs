//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use crate::inventory::MovementPlan;
use crate::ops::traits::{CommandContext, CommandHandler, CommandMetadata, OpsResult};
use shared::{EventPayload, OpsCommandPayload, OpsEvent};

mod attach_payment_proof;
mod checkout;
mod dispatch_order;
mod hr;
mod stock;
mod transition_order;

pub use attach_payment_proof::AttachPaymentProofAction;
pub use checkout::CheckoutAction;
pub use dispatch_order::DispatchOrderAction;
pub use hr::{
    GrantPointsAction, IssueSanctionAction, RecomputeScoreAction, RecordAttendanceAction,
    RecordPrayerAction,
};
pub use stock::{
    AdjustStockAction, ApplyMovementsAction, ReceiveProductionAction, RecordReturnAction,
    RegisterItemAction,
};
pub use transition_order::TransitionOrderAction;

/// Entity id for ledger-only events touching several SKUs
pub const LEDGER_ENTITY: &str = "ledger";

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    RegisterItem(RegisterItemAction),
    ApplyMovements(ApplyMovementsAction),
    ReceiveProduction(ReceiveProductionAction),
    RecordReturn(RecordReturnAction),
    AdjustStock(AdjustStockAction),
    Checkout(CheckoutAction),
    AttachPaymentProof(AttachPaymentProofAction),
    TransitionOrder(TransitionOrderAction),
    DispatchOrder(DispatchOrderAction),
    RecordAttendance(RecordAttendanceAction),
    RecordPrayer(RecordPrayerAction),
    IssueSanction(IssueSanctionAction),
    GrantPoints(GrantPointsAction),
    RecomputeScore(RecomputeScoreAction),
}

impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        match self {
            CommandAction::RegisterItem(action) => action.execute(ctx, metadata),
            CommandAction::ApplyMovements(action) => action.execute(ctx, metadata),
            CommandAction::ReceiveProduction(action) => action.execute(ctx, metadata),
            CommandAction::RecordReturn(action) => action.execute(ctx, metadata),
            CommandAction::AdjustStock(action) => action.execute(ctx, metadata),
            CommandAction::Checkout(action) => action.execute(ctx, metadata),
            CommandAction::AttachPaymentProof(action) => action.execute(ctx, metadata),
            CommandAction::TransitionOrder(action) => action.execute(ctx, metadata),
            CommandAction::DispatchOrder(action) => action.execute(ctx, metadata),
            CommandAction::RecordAttendance(action) => action.execute(ctx, metadata),
            CommandAction::RecordPrayer(action) => action.execute(ctx, metadata),
            CommandAction::IssueSanction(action) => action.execute(ctx, metadata),
            CommandAction::GrantPoints(action) => action.execute(ctx, metadata),
            CommandAction::RecomputeScore(action) => action.execute(ctx, metadata),
        }
    }
}

/// Convert a command payload to CommandAction
///
/// This is the ONLY place with a match on OpsCommandPayload.
impl From<&OpsCommandPayload> for CommandAction {
    fn from(payload: &OpsCommandPayload) -> Self {
        match payload {
            OpsCommandPayload::RegisterItem {
                sku,
                name,
                category,
                unit_cost,
                selling_price,
                initial_stock,
            } => CommandAction::RegisterItem(RegisterItemAction {
                sku: sku.clone(),
                name: name.clone(),
                category: *category,
                unit_cost: *unit_cost,
                selling_price: *selling_price,
                initial_stock: *initial_stock,
            }),
            OpsCommandPayload::ApplyMovements { movements, mode } => {
                CommandAction::ApplyMovements(ApplyMovementsAction {
                    movements: movements.clone(),
                    mode: *mode,
                })
            }
            OpsCommandPayload::ReceiveProduction {
                sku,
                name,
                quantity,
                unit_cost,
                selling_price,
                batch_ref,
            } => CommandAction::ReceiveProduction(ReceiveProductionAction {
                sku: sku.clone(),
                name: name.clone(),
                quantity: *quantity,
                unit_cost: *unit_cost,
                selling_price: *selling_price,
                batch_ref: batch_ref.clone(),
            }),
            OpsCommandPayload::RecordReturn {
                sku,
                quantity,
                reason,
            } => CommandAction::RecordReturn(RecordReturnAction {
                sku: sku.clone(),
                quantity: *quantity,
                reason: reason.clone(),
            }),
            OpsCommandPayload::AdjustStock {
                sku,
                counted,
                reason,
            } => CommandAction::AdjustStock(AdjustStockAction {
                sku: sku.clone(),
                counted: *counted,
                reason: reason.clone(),
            }),
            OpsCommandPayload::Checkout { order } => CommandAction::Checkout(CheckoutAction {
                input: order.clone(),
            }),
            OpsCommandPayload::AttachPaymentProof {
                order_id,
                kind,
                reference,
                amount,
            } => CommandAction::AttachPaymentProof(AttachPaymentProofAction {
                order_id: order_id.clone(),
                kind: *kind,
                reference: reference.clone(),
                amount: *amount,
            }),
            OpsCommandPayload::TransitionOrder {
                order_id,
                target,
                extra,
            } => CommandAction::TransitionOrder(TransitionOrderAction {
                order_id: order_id.clone(),
                target: *target,
                extra: extra.clone(),
            }),
            OpsCommandPayload::DispatchOrder {
                order_id,
                tracking_number,
                courier,
            } => CommandAction::DispatchOrder(DispatchOrderAction {
                order_id: order_id.clone(),
                tracking_number: tracking_number.clone(),
                courier: courier.clone(),
            }),
            OpsCommandPayload::RecordAttendance { record } => {
                CommandAction::RecordAttendance(RecordAttendanceAction {
                    record: record.clone(),
                })
            }
            OpsCommandPayload::RecordPrayer { record } => {
                CommandAction::RecordPrayer(RecordPrayerAction {
                    record: record.clone(),
                })
            }
            OpsCommandPayload::IssueSanction { sanction } => {
                CommandAction::IssueSanction(IssueSanctionAction {
                    sanction: sanction.clone(),
                })
            }
            OpsCommandPayload::GrantPoints { person_id, grant } => {
                CommandAction::GrantPoints(GrantPointsAction {
                    person_id: person_id.clone(),
                    grant: grant.clone(),
                })
            }
            OpsCommandPayload::RecomputeScore { person_id } => {
                CommandAction::RecomputeScore(RecomputeScoreAction {
                    person_id: person_id.clone(),
                })
            }
        }
    }
}

/// `StockMoved` event for a planned batch
fn stock_moved(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    entity_id: &str,
    plan: MovementPlan,
) -> OpsEvent {
    ctx.event(
        metadata,
        entity_id,
        EventPayload::StockMoved {
            entries: plan.entries,
            outcomes: plan.outcomes,
        },
    )
}
