//! Time utilities

use chrono::{DateTime, Utc};

/// Whole minutes elapsed from `start` to `end`.
///
/// Truncates toward zero; a submission inside the first minute of a contest
/// is at minute 0. Negative when `end` precedes `start`.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_minutes_between() {
        let start = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(minutes_between(start, start), 0);
        assert_eq!(minutes_between(start, start + Duration::seconds(59)), 0);
        assert_eq!(minutes_between(start, start + Duration::seconds(60)), 1);
        assert_eq!(minutes_between(start, start + Duration::minutes(35)), 35);
    }

    #[test]
    fn test_minutes_between_negative() {
        let start = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert!(minutes_between(start, start - Duration::minutes(2)) < 0);
    }
}
