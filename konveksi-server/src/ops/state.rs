//! Aggregate state of the operations core
//!
//! One serializable value holding every stock item, ledger entry, order,
//! sale, HR log, score and the activity trail. Keyed collections are
//! `BTreeMap`s so two equal states serialize to identical bytes.

use crate::activity::ActivityLog;
use crate::inventory::StockBook;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::hr::{AttendanceRecord, PerformanceScore, PointLogEntry, PrayerRecord, Sanction};
use shared::order::{Order, OrderStatus, Sale};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpsState {
    /// Sequence of the last applied event
    pub sequence: u64,
    pub stock: StockBook,
    pub orders: BTreeMap<String, Order>,
    pub sales: BTreeMap<String, Sale>,
    pub attendance: BTreeMap<String, AttendanceRecord>,
    pub prayers: BTreeMap<String, PrayerRecord>,
    pub sanctions: BTreeMap<String, Sanction>,
    /// Full point history per person, as of the last recompute
    pub point_logs: BTreeMap<String, Vec<PointLogEntry>>,
    pub scores: BTreeMap<String, PerformanceScore>,
    pub activity: ActivityLog,
    pub order_counter: u64,
    pub updated_at: i64,
}

/// One person's score inputs, copied out of the aggregate
#[derive(Debug, Clone, Default)]
pub struct PersonLogs {
    pub attendance: Vec<AttendanceRecord>,
    pub prayers: Vec<PrayerRecord>,
    pub sanctions: Vec<Sanction>,
    pub points: Vec<PointLogEntry>,
}

impl PersonLogs {
    pub fn upsert_attendance(&mut self, record: AttendanceRecord) {
        self.attendance.retain(|r| r.id != record.id);
        self.attendance.push(record);
    }

    pub fn upsert_prayer(&mut self, record: PrayerRecord) {
        self.prayers.retain(|r| r.id != record.id);
        self.prayers.push(record);
    }

    pub fn upsert_sanction(&mut self, sanction: Sanction) {
        self.sanctions.retain(|s| s.id != sanction.id);
        self.sanctions.push(sanction);
    }

    pub fn upsert_points(&mut self, entry: PointLogEntry) {
        self.points.retain(|p| p.id != entry.id);
        self.points.push(entry);
    }
}

impl OpsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity_capacity(capacity: usize) -> Self {
        Self {
            activity: ActivityLog::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Id the next placed order receives: `ORD{yyyymmdd}{10000 + n}`
    pub fn next_order_id(&self, date: NaiveDate) -> String {
        format!("ORD{}{}", date.format("%Y%m%d"), 10_000 + self.order_counter + 1)
    }

    pub fn person_logs(&self, person_id: &str) -> PersonLogs {
        PersonLogs {
            attendance: self
                .attendance
                .values()
                .filter(|r| r.person_id == person_id)
                .cloned()
                .collect(),
            prayers: self
                .prayers
                .values()
                .filter(|r| r.person_id == person_id)
                .cloned()
                .collect(),
            sanctions: self
                .sanctions
                .values()
                .filter(|s| s.person_id == person_id)
                .cloned()
                .collect(),
            points: self.point_logs.get(person_id).cloned().unwrap_or_default(),
        }
    }

    pub fn orders_with_status(&self, status: Option<OrderStatus>) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ids() {
        let mut state = OpsState::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(state.next_order_id(date), "ORD2026030210001");
        state.order_counter = 41;
        assert_eq!(state.next_order_id(date), "ORD2026030210042");
    }

    #[test]
    fn test_serialization_is_stable() {
        let mut a = OpsState::new();
        let mut b = OpsState::new();
        for (id, person) in [("a2", "p-2"), ("a1", "p-1")] {
            let record = AttendanceRecord {
                id: id.to_string(),
                person_id: person.to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                status: shared::hr::AttendanceStatus::Hadir,
                clock_in: None,
            };
            a.attendance.insert(id.to_string(), record);
        }
        for (id, person) in [("a1", "p-1"), ("a2", "p-2")] {
            let record = AttendanceRecord {
                id: id.to_string(),
                person_id: person.to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                status: shared::hr::AttendanceStatus::Hadir,
                clock_in: None,
            };
            b.attendance.insert(id.to_string(), record);
        }
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
        assert_eq!(a.person_logs("p-1").attendance.len(), 1);
    }
}
