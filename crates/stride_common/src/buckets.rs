//! Calendar bucketing for dashboard views.
//!
//! Every day in the requested range gets a key, whether or not a record falls
//! on it, so calendars can render empty days without a second lookup.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar::{day_key, weekday_label, DayRange};
use crate::streaks::DailyRecord;

/// One day of a trailing window, ready for charting
#[derive(Debug, Clone, Serialize)]
pub struct DaySlot<'a, R> {
    pub date: NaiveDate,
    pub key: String,
    pub weekday: &'static str,
    pub record: Option<&'a R>,
}

/// Day key -> record (or none) for every day in range.
///
/// When several records share a day the last one wins.
pub fn bucket_by_day<'a, R: DailyRecord>(
    records: &'a [R],
    range: &DayRange,
) -> BTreeMap<String, Option<&'a R>> {
    let mut buckets: BTreeMap<String, Option<&'a R>> =
        range.days().map(|day| (day_key(day), None)).collect();

    for record in records.iter().filter(|r| range.contains(r.day())) {
        buckets.insert(day_key(record.day()), Some(record));
    }
    buckets
}

/// Day key -> all records on that day, for every day in range
pub fn group_by_day<'a, R: DailyRecord>(
    records: &'a [R],
    range: &DayRange,
) -> BTreeMap<String, Vec<&'a R>> {
    let mut groups: BTreeMap<String, Vec<&'a R>> =
        range.days().map(|day| (day_key(day), Vec::new())).collect();

    for record in records.iter().filter(|r| range.contains(r.day())) {
        groups.entry(day_key(record.day())).or_default().push(record);
    }
    groups
}

/// The last `days` days ending today, oldest first, each paired with its record
pub fn trailing_window<'a, R: DailyRecord>(
    records: &'a [R],
    today: NaiveDate,
    days: u32,
) -> Vec<DaySlot<'a, R>> {
    let range = DayRange::trailing(today, days);
    let buckets = bucket_by_day(records, &range);

    range
        .days()
        .map(|date| {
            let key = day_key(date);
            let record = buckets.get(&key).copied().flatten();
            DaySlot {
                date,
                weekday: weekday_label(date),
                key,
                record,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Mark(NaiveDate, &'static str);

    impl DailyRecord for Mark {
        fn day(&self) -> NaiveDate {
            self.0
        }
        fn is_completed(&self) -> bool {
            true
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_bucket_month_covers_every_day() {
        let records = vec![
            Mark(d(2024, 9, 3), "a"),
            Mark(d(2024, 9, 17), "b"),
            Mark(d(2024, 9, 30), "c"),
            Mark(d(2024, 10, 1), "outside"),
        ];
        let range = DayRange::month(2024, 9).unwrap();
        let buckets = bucket_by_day(&records, &range);

        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets.values().filter(|r| r.is_none()).count(), 27);
        assert_eq!(buckets["2024-09-17"].map(|m| m.1), Some("b"));
        assert!(!buckets.contains_key("2024-10-01"));
    }

    #[test]
    fn test_bucket_last_record_wins() {
        let records = vec![Mark(d(2024, 9, 3), "first"), Mark(d(2024, 9, 3), "second")];
        let range = DayRange::month(2024, 9).unwrap();
        assert_eq!(bucket_by_day(&records, &range)["2024-09-03"].map(|m| m.1), Some("second"));
    }

    #[test]
    fn test_group_by_day_keeps_all() {
        let records = vec![Mark(d(2024, 2, 29), "x"), Mark(d(2024, 2, 29), "y")];
        let groups = group_by_day(&records, &DayRange::month(2024, 2).unwrap());
        assert_eq!(groups.len(), 29);
        assert_eq!(groups["2024-02-29"].len(), 2);
        assert!(groups["2024-02-01"].is_empty());
    }

    #[test]
    fn test_trailing_window_oldest_first() {
        let records = vec![Mark(d(2024, 9, 7), "today"), Mark(d(2024, 9, 1), "sunday")];
        let window = trailing_window(&records, d(2024, 9, 7), 7);

        assert_eq!(window.len(), 7);
        assert_eq!(window[0].key, "2024-09-01");
        assert_eq!(window[0].weekday, "Sun");
        assert_eq!(window[0].record.map(|m| m.1), Some("sunday"));
        assert!(window[3].record.is_none());
        assert_eq!(window[6].weekday, "Sat");
    }
}
