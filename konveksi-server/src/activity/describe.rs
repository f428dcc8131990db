//! Human-readable activity entries derived from command events
//!
//! A command produces one entry. Its subject is the first event that is not
//! a side effect (ledger movement or score refresh); commands made only of
//! side effects use their first event.

use shared::activity::{ActivityEntry, ActivityType};
use shared::inventory::MovementOutcome;
use shared::{EventPayload, OpsEvent};

/// Tracing target the activity trail is mirrored to
pub const AUDIT_TARGET: &str = "audit";

/// Activity entry for the events of one command
pub fn summarize(events: &[OpsEvent]) -> Option<ActivityEntry> {
    let primary = events
        .iter()
        .find(|e| !is_side_effect(&e.payload))
        .or_else(|| events.first())?;

    let (activity_type, description) = describe(&primary.payload);
    Some(ActivityEntry {
        id: format!("act-{:012}", primary.sequence),
        timestamp: primary.timestamp,
        actor_id: primary.actor_id.clone(),
        activity_type,
        description,
        related_entity_id: Some(primary.entity_id.clone()),
    })
}

fn is_side_effect(payload: &EventPayload) -> bool {
    matches!(
        payload,
        EventPayload::StockMoved { .. } | EventPayload::ScoreRecomputed { .. }
    )
}

fn describe(payload: &EventPayload) -> (ActivityType, String) {
    match payload {
        EventPayload::ItemRegistered { item } => (
            ActivityType::ItemRegistered,
            format!("Registered {} ({})", item.name, item.sku),
        ),
        EventPayload::StockMoved { entries, outcomes } => {
            let skipped = outcomes.iter().filter(|o| !o.is_applied()).count();
            let mut text = match entries.as_slice() {
                [one] => format!("{} {:+} {} → {}", one.kind, one.delta, one.sku, one.stock_after),
                many => format!("{} ledger entries appended", many.len()),
            };
            if skipped > 0 {
                let skus: Vec<&str> = outcomes
                    .iter()
                    .filter(|o| matches!(o, MovementOutcome::Skipped { .. }))
                    .map(|o| o.sku())
                    .collect();
                text.push_str(&format!(", skipped unknown {}", skus.join(", ")));
            }
            (ActivityType::StockMovement, text)
        }
        EventPayload::OrderPlaced { order } => (
            ActivityType::OrderPlaced,
            format!(
                "Order {} placed for {} ({} items)",
                order.id,
                order.customer.name,
                order.items.len()
            ),
        ),
        EventPayload::PaymentProofAttached { order_id, proof } => (
            ActivityType::PaymentProofAttached,
            format!("{} payment proof {} on {}", proof.kind, proof.reference, order_id),
        ),
        EventPayload::OrderStatusChanged {
            order_id, from, to, ..
        } => (
            ActivityType::OrderStatusChanged,
            format!("Order {}: {} → {}", order_id, from, to),
        ),
        EventPayload::OrderDispatched {
            order_id,
            tracking_number,
            ..
        } => (
            ActivityType::OrderDispatched,
            format!("Order {} dispatched, tracking {}", order_id, tracking_number),
        ),
        EventPayload::SaleRecorded { sale } => (
            ActivityType::SaleRecorded,
            format!("Sale {} recorded ({})", sale.id, sale.subtotal),
        ),
        EventPayload::SaleVoided { sale_id, .. } => {
            (ActivityType::SaleVoided, format!("Sale {} voided", sale_id))
        }
        EventPayload::AttendanceRecorded { record } => (
            ActivityType::AttendanceRecorded,
            format!(
                "Attendance {} for {} on {}",
                format!("{:?}", record.status).to_lowercase(),
                record.person_id,
                record.date
            ),
        ),
        EventPayload::PrayerRecorded { record } => (
            ActivityType::PrayerRecorded,
            format!(
                "Prayer {} for {} ({})",
                record.prayer,
                record.person_id,
                if record.on_time { "on time" } else { "late" }
            ),
        ),
        EventPayload::SanctionIssued { sanction } => (
            ActivityType::SanctionIssued,
            format!("Sanction for {}: {}", sanction.person_id, sanction.reason),
        ),
        EventPayload::PointsGranted { person_id, entry } => (
            ActivityType::PointsGranted,
            format!("{:+} {} points for {}", entry.delta, entry.category, person_id),
        ),
        EventPayload::ScoreRecomputed { result } => (
            ActivityType::ScoreRecomputed,
            format!(
                "Score of {} recomputed: {}",
                result.score.person_id, result.score.total
            ),
        ),
    }
}

/// Mirror an entry to the audit log files
pub fn mirror(entry: &ActivityEntry) {
    tracing::info!(
        target: AUDIT_TARGET,
        id = %entry.id,
        actor_id = %entry.actor_id,
        activity_type = %entry.activity_type,
        related_entity_id = ?entry.related_entity_id,
        "{}",
        entry.description
    );
}
