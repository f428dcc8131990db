//! Order lifecycle rules
//!
//! The status graph, payment-proof preconditions and the stock commit point
//! for both order kinds. Everything here is pure; the command engine pairs
//! these checks with ledger planning.
//!
//! ```text
//! standard   pending_payment ─► pending_gudang ─► approved_gudang ═► siap_kirim ─► diterima_kurir ─► selesai
//!                 (full)                              (dispatch)
//!
//! pre-order  pending_dp ─► in_production ─► pending_payment_remaining ─► ready_to_ship   ─► selesai
//!            (deposit)                          (remaining)          └► ready_for_pickup ─┘
//!
//! every non-terminal status ─► dibatalkan
//! ```

use shared::inventory::{Movement, MovementKind};
use shared::ops::TransitionExtra;
use shared::order::{Order, OrderKind, OrderStatus, ProofKind, Sale, SaleStatus};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Order {order_id}: cannot move from {from} to {to}: {reason}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
        reason: String,
    },

    #[error("Order {order_id}: a {required} payment proof is required before {to}")]
    PaymentProofRequired {
        order_id: String,
        required: ProofKind,
        to: OrderStatus,
    },

    #[error("Order {0} is closed ({1})")]
    OrderClosed(String, OrderStatus),

    #[error("Order {order_id}: {proof} proof does not fit this order kind")]
    ProofMismatch { order_id: String, proof: ProofKind },

    #[error("Order {order_id}: dispatch not allowed: {reason}")]
    DispatchNotAllowed { order_id: String, reason: String },

    #[error("Order {0}: stock already committed")]
    StockAlreadyCommitted(String),

    #[error("Order {0}: subtotal is too large")]
    AmountOverflow(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

use OrderStatus::*;

/// Statuses reachable from `from` by one edge
pub fn allowed_targets(kind: &OrderKind, from: OrderStatus) -> &'static [OrderStatus] {
    match (kind, from) {
        (OrderKind::Standard, PendingPayment) => &[PendingGudang, Dibatalkan],
        (OrderKind::Standard, PendingGudang) => &[ApprovedGudang, Dibatalkan],
        (OrderKind::Standard, ApprovedGudang) => &[SiapKirim, Dibatalkan],
        (OrderKind::Standard, SiapKirim) => &[DiterimaKurir, Dibatalkan],
        (OrderKind::Standard, DiterimaKurir) => &[Selesai, Dibatalkan],
        (OrderKind::PreOrder { .. }, PendingDp) => &[InProduction, Dibatalkan],
        (OrderKind::PreOrder { .. }, InProduction) => &[PendingPaymentRemaining, Dibatalkan],
        (OrderKind::PreOrder { .. }, PendingPaymentRemaining) => {
            &[ReadyToShip, ReadyForPickup, Dibatalkan]
        }
        (OrderKind::PreOrder { .. }, ReadyToShip) => &[Selesai, Dibatalkan],
        (OrderKind::PreOrder { .. }, ReadyForPickup) => &[Selesai, Dibatalkan],
        _ => &[],
    }
}

/// Proof that must be attached before taking the `from → to` edge
pub fn required_proof(from: OrderStatus, to: OrderStatus) -> Option<ProofKind> {
    match (from, to) {
        (PendingPayment, PendingGudang) => Some(ProofKind::Full),
        (PendingDp, InProduction) => Some(ProofKind::Deposit),
        (PendingPaymentRemaining, ReadyToShip | ReadyForPickup) => Some(ProofKind::Remaining),
        _ => None,
    }
}

/// Whether entering `target` is the moment this order's items leave stock
pub fn commits_stock(kind: &OrderKind, target: OrderStatus) -> bool {
    match kind {
        OrderKind::Standard => target == SiapKirim,
        OrderKind::PreOrder { .. } => target == Selesai,
    }
}

/// Proof kinds an order of this kind accepts
pub fn accepts_proof(kind: &OrderKind, proof: ProofKind) -> bool {
    match kind {
        OrderKind::Standard => proof == ProofKind::Full,
        OrderKind::PreOrder { .. } => matches!(proof, ProofKind::Deposit | ProofKind::Remaining),
    }
}

pub fn ensure_open(order: &Order) -> LifecycleResult<()> {
    if order.is_terminal() {
        return Err(LifecycleError::OrderClosed(order.id.clone(), order.status));
    }
    Ok(())
}

pub fn check_proof(order: &Order, proof: ProofKind) -> LifecycleResult<()> {
    ensure_open(order)?;
    if !accepts_proof(&order.kind, proof) {
        return Err(LifecycleError::ProofMismatch {
            order_id: order.id.clone(),
            proof,
        });
    }
    Ok(())
}

/// Validate a status change requested through a plain transition
///
/// Standard `approved_gudang → siap_kirim` is refused here: it needs a
/// tracking number and goes through [`check_dispatch`].
pub fn check_transition(order: &Order, target: OrderStatus) -> LifecycleResult<()> {
    ensure_open(order)?;

    let allowed = allowed_targets(&order.kind, order.status);
    if !allowed.contains(&target) {
        let reason = if allowed.is_empty() {
            "no outgoing transitions".to_string()
        } else {
            let names: Vec<&str> = allowed.iter().map(|s| s.as_str()).collect();
            format!("allowed targets are {}", names.join(", "))
        };
        return Err(LifecycleError::InvalidTransition {
            order_id: order.id.clone(),
            from: order.status,
            to: target,
            reason,
        });
    }

    if !order.kind.is_pre_order() && target == SiapKirim {
        return Err(LifecycleError::InvalidTransition {
            order_id: order.id.clone(),
            from: order.status,
            to: target,
            reason: "use dispatch with a tracking number".to_string(),
        });
    }

    if let Some(required) = required_proof(order.status, target)
        && !order.has_proof(required)
    {
        return Err(LifecycleError::PaymentProofRequired {
            order_id: order.id.clone(),
            required,
            to: target,
        });
    }

    if commits_stock(&order.kind, target) && order.stock_committed {
        return Err(LifecycleError::StockAlreadyCommitted(order.id.clone()));
    }

    Ok(())
}

pub fn check_dispatch(order: &Order, tracking_number: &str) -> LifecycleResult<()> {
    ensure_open(order)?;
    let refuse = |reason: &str| LifecycleError::DispatchNotAllowed {
        order_id: order.id.clone(),
        reason: reason.to_string(),
    };

    if order.kind.is_pre_order() {
        return Err(refuse("pre-orders are handed over on completion"));
    }
    if order.status != ApprovedGudang {
        return Err(refuse(&format!(
            "order is {}, dispatch needs approved_gudang",
            order.status
        )));
    }
    if tracking_number.trim().is_empty() {
        return Err(refuse("tracking number is required"));
    }
    if order.stock_committed {
        return Err(LifecycleError::StockAlreadyCommitted(order.id.clone()));
    }
    Ok(())
}

/// Record a validated status change on the order
pub fn apply_transition(
    order: &mut Order,
    target: OrderStatus,
    timestamp: i64,
    actor: &str,
    extra: &TransitionExtra,
) {
    order.record_status(target, timestamp, actor);
    if let Some(assignee) = &extra.assignee {
        order.assignee = Some(assignee.clone());
    }
    if let Some(date) = extra.estimated_completion_date {
        order.estimated_completion_date = Some(date);
    }
}

/// Validate and apply in one step, leaving `order` untouched on rejection
pub fn transition(
    order: &Order,
    target: OrderStatus,
    actor: &str,
    timestamp: i64,
    extra: &TransitionExtra,
) -> LifecycleResult<Order> {
    check_transition(order, target)?;
    let mut updated = order.clone();
    apply_transition(&mut updated, target, timestamp, actor, extra);
    Ok(updated)
}

/// Completed sale for an order's current items
pub fn build_sale(order: &Order, timestamp: i64, actor_id: &str) -> LifecycleResult<Sale> {
    let subtotal = order
        .subtotal()
        .ok_or_else(|| LifecycleError::AmountOverflow(order.id.clone()))?;
    Ok(Sale {
        id: Sale::id_for(&order.id),
        order_id: order.id.clone(),
        items: order.items.clone(),
        subtotal,
        created_at: timestamp,
        actor_id: actor_id.to_string(),
        status: SaleStatus::Completed,
        voided_at: None,
    })
}

/// `outbound-sale` movement per order line
pub fn sale_movements(order: &Order) -> Vec<Movement> {
    order
        .items
        .iter()
        .map(|item| {
            Movement::new(
                item.sku.clone(),
                -item.quantity,
                MovementKind::OutboundSale,
                format!("Order {}", order.id),
            )
        })
        .collect()
}

/// `inbound-return` movement per order line, undoing [`sale_movements`]
pub fn return_movements(order: &Order) -> Vec<Movement> {
    order
        .items
        .iter()
        .map(|item| {
            Movement::new(
                item.sku.clone(),
                item.quantity,
                MovementKind::InboundReturn,
                format!("Order {} cancelled", order.id),
            )
        })
        .collect()
}
