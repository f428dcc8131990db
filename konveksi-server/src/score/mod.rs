//! Score engine
//!
//! Deterministic recompute of per-person performance scores from
//! attendance, prayer, sanction and manual point logs.

pub mod engine;

use chrono::NaiveTime;

pub use engine::{is_generated_id, recompute};

/// Point values and the punctuality window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRules {
    pub work_start: NaiveTime,
    /// Minutes after `work_start` that still count as on time
    pub grace_minutes: i64,
    /// Starting value of the punctuality and discipline subtotals
    pub base: i64,
    pub on_time_points: i64,
    pub late_penalty: i64,
    pub absence_penalty: i64,
    pub prayer_points: i64,
    pub warning_penalty: i64,
    pub suspension_penalty: i64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            work_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            grace_minutes: 5,
            base: 50,
            on_time_points: 2,
            late_penalty: -1,
            absence_penalty: -5,
            prayer_points: 1,
            warning_penalty: -10,
            suspension_penalty: -25,
        }
    }
}
