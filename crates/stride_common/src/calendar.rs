//! Calendar utilities shared by every tracker component.
//!
//! Tasks and workout logs carry calendar days, not instants. A day is always
//! built from local year/month/day fields; parsing a UTC ISO string and taking
//! its date shifts the day near timezone boundaries, so nothing here does that.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

use crate::error::{Result, StrideError};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Local midnight for the given calendar date
pub fn local_day_start(year: i32, month: u32, day: u32) -> Result<DateTime<Local>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| StrideError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| StrideError::InvalidDate(date.to_string()))?;
    // earliest() resolves the repeated hour on DST fall-back days
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| StrideError::InvalidDate(format!("{} has no local midnight", date)))
}

/// Calendar day of an instant, read from its local fields
pub fn local_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Today's local calendar day from the wall clock
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// "YYYY-MM-DD" key for a calendar day
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// "YYYY-MM-DD" key for an instant, using its local calendar fields
pub fn instant_day_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    day_key(local_day(instant))
}

/// Parse a "YYYY-MM-DD" key as a local calendar day
pub fn parse_day_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
        .map_err(|e| StrideError::InvalidDate(format!("'{}': {}", key, e)))
}

/// Shift a day by whole days (negative goes back)
pub fn add_days(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Whole days from `from` to `to` (positive when `to` is later)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Short weekday label ("Sun".."Sat")
pub fn weekday_label(day: NaiveDate) -> &'static str {
    DAY_NAMES[day.weekday().num_days_from_sunday() as usize]
}

/// Label used by day-by-day charts, e.g. "Sun 5"
pub fn weekday_day_label(day: NaiveDate) -> String {
    format!("{} {}", weekday_label(day), day.day())
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| StrideError::InvalidDate(format!("{:04}-{:02}", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| StrideError::InvalidDate(format!("{:04}-{:02}", year, month)))?;
    Ok(days_between(first, next) as u32)
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(StrideError::InvalidDate(format!(
                "range end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Every day of a calendar month
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let len = days_in_month(year, month)?;
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| StrideError::InvalidDate(format!("{:04}-{:02}", year, month)))?;
        Ok(Self {
            start,
            end: add_days(start, len as i64 - 1),
        })
    }

    /// The `days` days ending at `today` (inclusive). Zero days is treated as one.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let span = days.max(1) as i64;
        Self {
            start: add_days(today, -(span - 1)),
            end: today,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn len(&self) -> usize {
        (days_between(self.start, self.end) + 1) as usize
    }

    /// Days oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len() as i64).map(move |i| add_days(start, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_local_day_start_is_local_midnight() {
        let start = local_day_start(2024, 3, 15).unwrap();
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(local_day(&start), d(2024, 3, 15));
        assert_eq!(instant_day_key(&start), "2024-03-15");
    }

    #[test]
    fn test_local_day_start_rejects_bad_date() {
        assert!(local_day_start(2023, 2, 29).is_err());
        assert!(local_day_start(2024, 13, 1).is_err());
    }

    #[test]
    fn test_day_key_round_trip() {
        let day = parse_day_key("2024-01-05").unwrap();
        assert_eq!(day, d(2024, 1, 5));
        assert_eq!(day_key(day), "2024-01-05");
        assert!(parse_day_key("2024-1-32").is_err());
        assert!(parse_day_key("yesterday").is_err());
    }

    #[test]
    fn test_add_days_and_between() {
        assert_eq!(add_days(d(2024, 2, 28), 1), d(2024, 2, 29));
        assert_eq!(add_days(d(2024, 3, 1), -1), d(2024, 2, 29));
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 12, 31)), 365);
        assert_eq!(days_between(d(2024, 1, 10), d(2024, 1, 1)), -9);
    }

    #[test]
    fn test_weekday_labels() {
        // 2024-09-01 was a Sunday
        assert_eq!(weekday_label(d(2024, 9, 1)), "Sun");
        assert_eq!(weekday_label(d(2024, 9, 7)), "Sat");
        assert_eq!(weekday_day_label(d(2024, 9, 5)), "Thu 5");
    }

    #[test]
    fn test_month_range() {
        let range = DayRange::month(2024, 2).unwrap();
        assert_eq!(range.len(), 29);
        assert_eq!(range.end, d(2024, 2, 29));
        assert_eq!(DayRange::month(2023, 12).unwrap().end, d(2023, 12, 31));
        assert!(DayRange::month(2023, 0).is_err());
    }

    #[test]
    fn test_trailing_range() {
        let range = DayRange::trailing(d(2024, 3, 2), 7);
        assert_eq!(range.start, d(2024, 2, 25));
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d(2024, 2, 25));
        assert_eq!(days[6], d(2024, 3, 2));
        assert!(DayRange::new(d(2024, 3, 2), d(2024, 3, 1)).is_err());
    }
}
