//! Performance score recompute
//!
//! A pure function of the person's source logs. It never patches a previous
//! result: punctuality and discipline entries are regenerated from scratch,
//! operator-entered entries are carried over untouched.
//!
//! ```text
//! attendance ─┐
//! prayers ────┼─► generated entries ─┐
//! sanctions ──┘                      ├─► dedupe by id ─► sort ─► subtotals ─► total
//! prior manual entries ──────────────┘
//! ```

use super::ScoreRules;
use chrono::Duration;
use shared::hr::{
    AttendanceRecord, AttendanceStatus, PerformanceScore, PointCategory, PointLogEntry,
    PrayerRecord, Sanction, SanctionKind, ScoreResult,
};
use std::collections::BTreeMap;

const ATTENDANCE_PREFIX: &str = "att-";
const SANCTION_PREFIX: &str = "sanction-";
const PRAYER_PREFIX: &str = "prayer-";

/// Ids in the namespace of entries regenerated from HR logs
pub fn is_generated_id(id: &str) -> bool {
    [ATTENDANCE_PREFIX, SANCTION_PREFIX, PRAYER_PREFIX]
        .iter()
        .any(|prefix| id.starts_with(prefix))
}

/// Rebuild one person's score and full point history
///
/// Records belonging to other persons are ignored, so callers may pass
/// whole logs. Input order does not matter and equal inputs give equal
/// output.
pub fn recompute(
    person_id: &str,
    attendance: &[AttendanceRecord],
    prayers: &[PrayerRecord],
    sanctions: &[Sanction],
    prior_entries: &[PointLogEntry],
    rules: &ScoreRules,
    computed_at: i64,
) -> ScoreResult {
    let generated = attendance
        .iter()
        .filter(|r| r.person_id == person_id)
        .filter_map(|r| punctuality_entry(r, rules))
        .chain(
            sanctions
                .iter()
                .filter(|s| s.person_id == person_id)
                .map(|s| sanction_entry(s, rules)),
        )
        .chain(
            prayers
                .iter()
                .filter(|p| p.person_id == person_id)
                .filter_map(|p| prayer_entry(p, rules)),
        );

    let manual = prior_entries
        .iter()
        .filter(|e| !e.category.is_generated())
        .cloned();

    // Generated and manual entries never replace each other
    let mut by_id: BTreeMap<(bool, String), PointLogEntry> = BTreeMap::new();
    for entry in generated.chain(manual) {
        let key = (entry.category.is_generated(), entry.id.clone());
        match by_id.get(&key) {
            // Same id twice: keep the greater entry so input order never matters
            Some(existing) if *existing >= entry => {}
            _ => {
                by_id.insert(key, entry);
            }
        }
    }

    let mut history: Vec<PointLogEntry> = by_id.into_values().collect();
    history.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.cmp(b))
    });

    let score = summarize(person_id, &history, rules, computed_at);
    ScoreResult { score, history }
}

fn punctuality_entry(record: &AttendanceRecord, rules: &ScoreRules) -> Option<PointLogEntry> {
    let (delta, reason) = match (record.status, record.clock_in) {
        (AttendanceStatus::Alfa, _) => (rules.absence_penalty, "Absent without notice".to_string()),
        (AttendanceStatus::Hadir, Some(clock_in)) => {
            let deadline = rules.work_start + Duration::minutes(rules.grace_minutes);
            if clock_in <= deadline {
                (
                    rules.on_time_points,
                    format!("On time ({})", clock_in.format("%H:%M")),
                )
            } else {
                let late = (clock_in - rules.work_start).num_minutes();
                (
                    rules.late_penalty,
                    format!("Late {} min ({})", late, clock_in.format("%H:%M")),
                )
            }
        }
        _ => return None,
    };

    Some(PointLogEntry {
        id: format!("{}{}", ATTENDANCE_PREFIX, record.id),
        date: record.date,
        delta,
        category: PointCategory::Punctuality,
        reason,
        granted_by: None,
    })
}

fn sanction_entry(sanction: &Sanction, rules: &ScoreRules) -> PointLogEntry {
    let (delta, label) = match sanction.kind {
        SanctionKind::Warning => (rules.warning_penalty, "Warning"),
        SanctionKind::Suspension => (rules.suspension_penalty, "Suspension"),
    };
    PointLogEntry {
        id: format!("{}{}", SANCTION_PREFIX, sanction.id),
        date: sanction.date,
        delta,
        category: PointCategory::Discipline,
        reason: format!("{}: {}", label, sanction.reason),
        granted_by: sanction.issued_by.clone(),
    }
}

fn prayer_entry(record: &PrayerRecord, rules: &ScoreRules) -> Option<PointLogEntry> {
    if !record.on_time {
        return None;
    }
    Some(PointLogEntry {
        id: format!("{}{}", PRAYER_PREFIX, record.id),
        date: record.date,
        delta: rules.prayer_points,
        category: PointCategory::Discipline,
        reason: format!("Prayer on time ({})", record.prayer),
        granted_by: None,
    })
}

fn summarize(
    person_id: &str,
    history: &[PointLogEntry],
    rules: &ScoreRules,
    computed_at: i64,
) -> PerformanceScore {
    // Saturating: entries restored from a snapshot are not range-checked
    let sum = |category: PointCategory| -> i64 {
        history
            .iter()
            .filter(|e| e.category == category)
            .fold(0i64, |acc, e| acc.saturating_add(e.delta))
    };

    let punctuality = rules.base.saturating_add(sum(PointCategory::Punctuality)).max(0);
    let discipline = rules.base.saturating_add(sum(PointCategory::Discipline)).max(0);
    let productivity = sum(PointCategory::Productivity);
    let initiative = sum(PointCategory::Initiative);
    let adjustment = sum(PointCategory::Adjustment);
    let total = [discipline, productivity, initiative, adjustment]
        .into_iter()
        .fold(punctuality, i64::saturating_add);

    PerformanceScore {
        person_id: person_id.to_string(),
        total: total.max(0),
        punctuality,
        discipline,
        productivity,
        initiative,
        adjustment,
        computed_at,
    }
}
