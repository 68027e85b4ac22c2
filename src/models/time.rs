//! Timestamp helpers
//!
//! Planner timestamps are kept at whole-second precision, the same precision
//! the backup format carries, so an export/import round trip is lossless.

use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};

/// Current time truncated to whole seconds
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Truncate an arbitrary timestamp to whole seconds
pub fn to_seconds(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(0)
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn test_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ts = start_of_day(date);
        assert_eq!(ts.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }
}
