//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions of (state, event).

use enum_dispatch::enum_dispatch;

use crate::ops::state::OpsState;
use crate::ops::traits::EventApplier;
use shared::{EventPayload, OpsEvent};

mod hr;
mod orders;
mod stock;

pub use hr::{
    AttendanceRecordedApplier, PointsGrantedApplier, PrayerRecordedApplier,
    SanctionIssuedApplier, ScoreRecomputedApplier,
};
pub use orders::{
    OrderDispatchedApplier, OrderPlacedApplier, OrderStatusChangedApplier,
    PaymentProofAttachedApplier, SaleRecordedApplier, SaleVoidedApplier,
};
pub use stock::{ItemRegisteredApplier, StockMovedApplier};

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    ItemRegistered(ItemRegisteredApplier),
    StockMoved(StockMovedApplier),
    OrderPlaced(OrderPlacedApplier),
    PaymentProofAttached(PaymentProofAttachedApplier),
    OrderStatusChanged(OrderStatusChangedApplier),
    OrderDispatched(OrderDispatchedApplier),
    SaleRecorded(SaleRecordedApplier),
    SaleVoided(SaleVoidedApplier),
    AttendanceRecorded(AttendanceRecordedApplier),
    PrayerRecorded(PrayerRecordedApplier),
    SanctionIssued(SanctionIssuedApplier),
    PointsGranted(PointsGrantedApplier),
    ScoreRecomputed(ScoreRecomputedApplier),
}

/// Convert OpsEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OpsEvent> for EventAction {
    fn from(event: &OpsEvent) -> Self {
        match &event.payload {
            EventPayload::ItemRegistered { .. } => ItemRegisteredApplier.into(),
            EventPayload::StockMoved { .. } => StockMovedApplier.into(),
            EventPayload::OrderPlaced { .. } => OrderPlacedApplier.into(),
            EventPayload::PaymentProofAttached { .. } => PaymentProofAttachedApplier.into(),
            EventPayload::OrderStatusChanged { .. } => OrderStatusChangedApplier.into(),
            EventPayload::OrderDispatched { .. } => OrderDispatchedApplier.into(),
            EventPayload::SaleRecorded { .. } => SaleRecordedApplier.into(),
            EventPayload::SaleVoided { .. } => SaleVoidedApplier.into(),
            EventPayload::AttendanceRecorded { .. } => AttendanceRecordedApplier.into(),
            EventPayload::PrayerRecorded { .. } => PrayerRecordedApplier.into(),
            EventPayload::SanctionIssued { .. } => SanctionIssuedApplier.into(),
            EventPayload::PointsGranted { .. } => PointsGrantedApplier.into(),
            EventPayload::ScoreRecomputed { .. } => ScoreRecomputedApplier.into(),
        }
    }
}

/// Apply one event, whatever its type
pub fn apply_event(state: &mut OpsState, event: &OpsEvent) {
    EventAction::from(event).apply(state, event);
}
