//! HR command handlers
//!
//! Every HR write is followed by a `ScoreRecomputed` event for the person,
//! computed from the logs as they will be once the write is applied.
//! Records are upserted by id, so re-sending a corrected record replaces it.

use crate::ops::state::PersonLogs;
use crate::ops::traits::{
    CommandContext, CommandHandler, CommandMetadata, OpsError, OpsResult, require_text,
};
use crate::score;
use shared::hr::{AttendanceRecord, PointLogEntry, PrayerRecord, Sanction};
use shared::ops::PointGrant;
use shared::{EventPayload, OpsEvent};
use validator::Validate;

fn rescored(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    person_id: &str,
    logs: &PersonLogs,
) -> OpsEvent {
    let result = score::recompute(
        person_id,
        &logs.attendance,
        &logs.prayers,
        &logs.sanctions,
        &logs.points,
        ctx.rules(),
        metadata.timestamp,
    );
    ctx.event(metadata, person_id, EventPayload::ScoreRecomputed { result })
}

/// An id already recorded for someone else cannot be moved to `person_id`
fn same_owner(existing: Option<&str>, person_id: &str, id: &str) -> OpsResult<()> {
    match existing {
        Some(owner) if owner != person_id => Err(OpsError::Validation(format!(
            "record {} belongs to {}",
            id, owner
        ))),
        _ => Ok(()),
    }
}

/// RecordAttendance action
#[derive(Debug, Clone)]
pub struct RecordAttendanceAction {
    pub record: AttendanceRecord,
}

impl CommandHandler for RecordAttendanceAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.record.id, "id")?;
        require_text(&self.record.person_id, "person_id")?;
        same_owner(
            ctx.state().attendance.get(&self.record.id).map(|r| r.person_id.as_str()),
            &self.record.person_id,
            &self.record.id,
        )?;

        let person_id = self.record.person_id.clone();
        let mut logs = ctx.state().person_logs(&person_id);
        logs.upsert_attendance(self.record.clone());

        let recorded = ctx.event(
            metadata,
            &person_id,
            EventPayload::AttendanceRecorded {
                record: self.record.clone(),
            },
        );
        let score = rescored(ctx, metadata, &person_id, &logs);
        Ok(vec![recorded, score])
    }
}

/// RecordPrayer action
#[derive(Debug, Clone)]
pub struct RecordPrayerAction {
    pub record: PrayerRecord,
}

impl CommandHandler for RecordPrayerAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.record.id, "id")?;
        require_text(&self.record.person_id, "person_id")?;
        require_text(&self.record.prayer, "prayer")?;
        same_owner(
            ctx.state().prayers.get(&self.record.id).map(|r| r.person_id.as_str()),
            &self.record.person_id,
            &self.record.id,
        )?;

        let person_id = self.record.person_id.clone();
        let mut logs = ctx.state().person_logs(&person_id);
        logs.upsert_prayer(self.record.clone());

        let recorded = ctx.event(
            metadata,
            &person_id,
            EventPayload::PrayerRecorded {
                record: self.record.clone(),
            },
        );
        let score = rescored(ctx, metadata, &person_id, &logs);
        Ok(vec![recorded, score])
    }
}

/// IssueSanction action
#[derive(Debug, Clone)]
pub struct IssueSanctionAction {
    pub sanction: Sanction,
}

impl CommandHandler for IssueSanctionAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.sanction.id, "id")?;
        require_text(&self.sanction.person_id, "person_id")?;
        require_text(&self.sanction.reason, "reason")?;
        same_owner(
            ctx.state().sanctions.get(&self.sanction.id).map(|s| s.person_id.as_str()),
            &self.sanction.person_id,
            &self.sanction.id,
        )?;

        let mut sanction = self.sanction.clone();
        if sanction.issued_by.is_none() {
            sanction.issued_by = Some(metadata.actor_id.clone());
        }

        let person_id = sanction.person_id.clone();
        let mut logs = ctx.state().person_logs(&person_id);
        logs.upsert_sanction(sanction.clone());

        let issued = ctx.event(metadata, &person_id, EventPayload::SanctionIssued { sanction });
        let score = rescored(ctx, metadata, &person_id, &logs);
        Ok(vec![issued, score])
    }
}

/// GrantPoints action
///
/// Only the operator-entered categories can be granted; punctuality and
/// discipline come from the HR logs, and so do ids in their namespace.
#[derive(Debug, Clone)]
pub struct GrantPointsAction {
    pub person_id: String,
    pub grant: PointGrant,
}

impl CommandHandler for GrantPointsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.person_id, "person_id")?;
        require_text(&self.grant.reason, "reason")?;
        if self.grant.category.is_generated() {
            return Err(OpsError::InvalidPointCategory(self.grant.category));
        }
        self.grant.validate()?;
        if let Some(id) = self.grant.id.as_deref().filter(|id| score::is_generated_id(id)) {
            return Err(OpsError::Validation(format!(
                "point id {} is reserved for generated entries",
                id
            )));
        }

        let entry = PointLogEntry {
            id: self
                .grant
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("pts-{}", metadata.command_id)),
            date: self.grant.date,
            delta: self.grant.delta,
            category: self.grant.category,
            reason: self.grant.reason.clone(),
            granted_by: Some(metadata.actor_id.clone()),
        };

        let mut logs = ctx.state().person_logs(&self.person_id);
        logs.upsert_points(entry.clone());

        let granted = ctx.event(
            metadata,
            &self.person_id,
            EventPayload::PointsGranted {
                person_id: self.person_id.clone(),
                entry,
            },
        );
        let score = rescored(ctx, metadata, &self.person_id, &logs);
        Ok(vec![granted, score])
    }
}

/// RecomputeScore action
#[derive(Debug, Clone)]
pub struct RecomputeScoreAction {
    pub person_id: String,
}

impl CommandHandler for RecomputeScoreAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.person_id, "person_id")?;
        let logs = ctx.state().person_logs(&self.person_id);
        Ok(vec![rescored(ctx, metadata, &self.person_id, &logs)])
    }
}
