//! HR event appliers

use crate::ops::state::OpsState;
use crate::ops::traits::EventApplier;
use shared::{EventPayload, OpsEvent};

/// AttendanceRecorded applier
pub struct AttendanceRecordedApplier;

impl EventApplier for AttendanceRecordedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::AttendanceRecorded { record } = &event.payload {
            state.attendance.insert(record.id.clone(), record.clone());
        }
    }
}

/// PrayerRecorded applier
pub struct PrayerRecordedApplier;

impl EventApplier for PrayerRecordedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::PrayerRecorded { record } = &event.payload {
            state.prayers.insert(record.id.clone(), record.clone());
        }
    }
}

/// SanctionIssued applier
pub struct SanctionIssuedApplier;

impl EventApplier for SanctionIssuedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::SanctionIssued { sanction } = &event.payload {
            state.sanctions.insert(sanction.id.clone(), sanction.clone());
        }
    }
}

/// PointsGranted applier
pub struct PointsGrantedApplier;

impl EventApplier for PointsGrantedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::PointsGranted { person_id, entry } = &event.payload {
            let log = state.point_logs.entry(person_id.clone()).or_default();
            log.retain(|e| e.id != entry.id);
            log.push(entry.clone());
        }
    }
}

/// ScoreRecomputed applier
///
/// Replaces the person's score and point history wholesale.
pub struct ScoreRecomputedApplier;

impl EventApplier for ScoreRecomputedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::ScoreRecomputed { result } = &event.payload {
            let person_id = result.score.person_id.clone();
            state
                .point_logs
                .insert(person_id.clone(), result.history.clone());
            state.scores.insert(person_id, result.score.clone());
        }
    }
}
