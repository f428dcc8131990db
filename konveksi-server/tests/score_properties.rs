//! Property-based tests for the score engine

use chrono::{NaiveDate, NaiveTime};
use konveksi_server::score::{ScoreRules, recompute};
use proptest::prelude::*;
use shared::hr::{
    AttendanceRecord, AttendanceStatus, PointCategory, PointLogEntry, PrayerRecord, Sanction,
    SanctionKind,
};

const PERSON: &str = "p-7";

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1 + offset).unwrap()
}

fn status_strategy() -> impl Strategy<Value = AttendanceStatus> {
    prop_oneof![
        4 => Just(AttendanceStatus::Hadir),
        1 => Just(AttendanceStatus::Izin),
        1 => Just(AttendanceStatus::Sakit),
        1 => Just(AttendanceStatus::Cuti),
        1 => Just(AttendanceStatus::Alfa),
    ]
}

fn attendance_strategy() -> impl Strategy<Value = Vec<AttendanceRecord>> {
    prop::collection::vec((0u32..28, status_strategy(), 6u32..11, 0u32..60), 0..25).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (d, status, h, m))| AttendanceRecord {
                    id: format!("a{}", i),
                    person_id: if i % 5 == 4 { "other".to_string() } else { PERSON.to_string() },
                    date: day(d),
                    status,
                    clock_in: NaiveTime::from_hms_opt(h, m, 0),
                })
                .collect()
        },
    )
}

fn prayer_strategy() -> impl Strategy<Value = Vec<PrayerRecord>> {
    prop::collection::vec((0u32..28, any::<bool>()), 0..20).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (d, on_time))| PrayerRecord {
                id: format!("pr{}", i),
                person_id: PERSON.to_string(),
                date: day(d),
                prayer: "dzuhur".to_string(),
                on_time,
            })
            .collect()
    })
}

fn sanction_strategy() -> impl Strategy<Value = Vec<Sanction>> {
    prop::collection::vec((0u32..28, any::<bool>()), 0..6).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (d, suspension))| Sanction {
                id: format!("s{}", i),
                person_id: PERSON.to_string(),
                date: day(d),
                kind: if suspension { SanctionKind::Suspension } else { SanctionKind::Warning },
                reason: "pelanggaran".to_string(),
                issued_by: None,
            })
            .collect()
    })
}

fn manual_strategy() -> impl Strategy<Value = Vec<PointLogEntry>> {
    let category = prop_oneof![
        Just(PointCategory::Productivity),
        Just(PointCategory::Initiative),
        Just(PointCategory::Adjustment),
        // Generated categories must be dropped on recompute
        Just(PointCategory::Punctuality),
    ];
    prop::collection::vec((0u32..28, -20i64..20, category), 0..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (d, delta, category))| PointLogEntry {
                id: format!("m{}", i),
                date: day(d),
                delta,
                category,
                reason: "manual".to_string(),
                granted_by: Some("spv".to_string()),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn recompute_is_deterministic(
        attendance in attendance_strategy(),
        prayers in prayer_strategy(),
        sanctions in sanction_strategy(),
        manual in manual_strategy(),
    ) {
        let rules = ScoreRules::default();
        let first = recompute(PERSON, &attendance, &prayers, &sanctions, &manual, &rules, 1);
        let second = recompute(PERSON, &attendance, &prayers, &sanctions, &manual, &rules, 1);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn input_order_does_not_matter(
        (attendance, shuffled_attendance) in attendance_strategy()
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        (sanctions, shuffled_sanctions) in sanction_strategy()
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        manual in manual_strategy(),
    ) {
        let rules = ScoreRules::default();
        let mut reversed_manual = manual.clone();
        reversed_manual.reverse();

        let a = recompute(PERSON, &attendance, &[], &sanctions, &manual, &rules, 9);
        let b = recompute(
            PERSON,
            &shuffled_attendance,
            &[],
            &shuffled_sanctions,
            &reversed_manual,
            &rules,
            9,
        );
        prop_assert_eq!(a, b);
    }

    #[test]
    fn recompute_over_own_history_is_stable(
        attendance in attendance_strategy(),
        sanctions in sanction_strategy(),
        manual in manual_strategy(),
    ) {
        let rules = ScoreRules::default();
        let first = recompute(PERSON, &attendance, &[], &sanctions, &manual, &rules, 3);
        let again = recompute(PERSON, &attendance, &[], &sanctions, &first.history, &rules, 3);
        prop_assert_eq!(first, again);
    }

    #[test]
    fn subtotals_respect_floors_and_sum(
        attendance in attendance_strategy(),
        prayers in prayer_strategy(),
        sanctions in sanction_strategy(),
        manual in manual_strategy(),
    ) {
        let rules = ScoreRules::default();
        let result = recompute(PERSON, &attendance, &prayers, &sanctions, &manual, &rules, 0);
        let s = &result.score;
        prop_assert!(s.punctuality >= 0);
        prop_assert!(s.discipline >= 0);
        prop_assert!(s.total >= 0);
        let raw = s.punctuality + s.discipline + s.productivity + s.initiative + s.adjustment;
        prop_assert_eq!(s.total, raw.max(0));

        for pair in result.history.windows(2) {
            prop_assert!(pair[0].date >= pair[1].date);
        }
        prop_assert!(result.history.iter().all(|e| !e.id.starts_with("att-a4")));
    }
}
