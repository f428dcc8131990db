//! HR source logs and derived performance score types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Daily attendance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present
    Hadir,
    /// Excused leave
    Izin,
    /// Sick leave
    Sakit,
    /// Annual leave
    Cuti,
    /// Absent without notice
    Alfa,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub person_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_in: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrayerRecord {
    pub id: String,
    pub person_id: String,
    pub date: NaiveDate,
    /// Prayer name (subuh, dzuhur, ...)
    pub prayer: String,
    pub on_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionKind {
    Warning,
    Suspension,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sanction {
    pub id: String,
    pub person_id: String,
    pub date: NaiveDate,
    pub kind: SanctionKind,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
}

/// Score category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCategory {
    Punctuality,
    Discipline,
    Productivity,
    Initiative,
    Adjustment,
}

impl PointCategory {
    /// Machine-generated categories are rebuilt on every recompute
    pub fn is_generated(&self) -> bool {
        matches!(self, PointCategory::Punctuality | PointCategory::Discipline)
    }
}

impl std::fmt::Display for PointCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PointCategory::Punctuality => "punctuality",
            PointCategory::Discipline => "discipline",
            PointCategory::Productivity => "productivity",
            PointCategory::Initiative => "initiative",
            PointCategory::Adjustment => "adjustment",
        };
        f.write_str(s)
    }
}

/// One line of a person's point history
///
/// Field order is the tie-break order when two entries share an id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointLogEntry {
    pub id: String,
    pub date: NaiveDate,
    pub delta: i64,
    pub category: PointCategory,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
}

/// Derived performance score, never edited by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub person_id: String,
    pub total: i64,
    pub punctuality: i64,
    pub discipline: i64,
    pub productivity: i64,
    pub initiative: i64,
    pub adjustment: i64,
    /// Unix milliseconds
    pub computed_at: i64,
}

/// Output of a full recompute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: PerformanceScore,
    pub history: Vec<PointLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_categories() {
        assert!(PointCategory::Punctuality.is_generated());
        assert!(PointCategory::Discipline.is_generated());
        assert!(!PointCategory::Initiative.is_generated());
        assert!(!PointCategory::Adjustment.is_generated());
    }

    #[test]
    fn test_attendance_roundtrip_shape() {
        let json = r#"{"id":"a-1","person_id":"p-7","date":"2026-03-02","status":"hadir","clock_in":"08:10:00"}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, AttendanceStatus::Hadir);
        assert_eq!(record.clock_in, NaiveTime::from_hms_opt(8, 10, 0));
    }
}
