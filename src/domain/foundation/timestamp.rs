//! Timestamp value object for immutable points in time.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Calendar day of this instant as observed at the given UTC offset.
    pub fn calendar_date(&self, offset: FixedOffset) -> NaiveDate {
        self.0.with_timezone(&offset).date_naive()
    }

    /// True when both instants fall on the same calendar day at `offset`.
    pub fn same_calendar_day(&self, other: &Timestamp, offset: FixedOffset) -> bool {
        self.calendar_date(offset) == other.calendar_date(offset)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use std::thread::sleep;
    use std::time::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_is_before_works_correctly() {
        let ts1 = Timestamp::now();
        sleep(Duration::from_millis(10));
        let ts2 = Timestamp::now();

        assert!(ts1.is_before(&ts2));
        assert!(!ts2.is_before(&ts1));
        assert!(ts2.is_after(&ts1));
    }

    #[test]
    fn calendar_date_respects_offset() {
        let ts = at(2024, 5, 10, 23);
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(ts.calendar_date(utc).day(), 10);
        assert_eq!(ts.calendar_date(plus_two).day(), 11);
    }

    #[test]
    fn same_calendar_day_ignores_time_of_day() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(at(2024, 5, 10, 1).same_calendar_day(&at(2024, 5, 10, 22), utc));
        assert!(!at(2024, 5, 10, 1).same_calendar_day(&at(2024, 5, 11, 1), utc));
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let ts = at(2024, 1, 15, 10);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn display_uses_date_time_format() {
        assert_eq!(at(2024, 1, 15, 10).to_string(), "2024-01-15 10:00:00");
    }
}
