/// Current UTC time in Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Calendar date (UTC) of a Unix millisecond timestamp
pub fn date_of_millis(millis: i64) -> chrono::NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_of_millis() {
        // 2026-01-01T00:00:00Z
        let date = date_of_millis(1_767_225_600_000);
        assert_eq!(date.to_string(), "2026-01-01");
    }
}
