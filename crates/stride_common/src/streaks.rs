//! Streak calculation for workout logs and daily tasks (v0.1.0).
//!
//! Two independent rules:
//! - gym streak: consecutive days with a completed log, anchored at today or yesterday
//! - work streak: consecutive days meeting a completion-rate threshold, where
//!   days without tasks are neutral
//!
//! `today` is always passed in; nothing here reads the wall clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calendar::{add_days, days_between};

/// A record that belongs to one calendar day and can be completed
pub trait DailyRecord {
    fn day(&self) -> NaiveDate;
    fn is_completed(&self) -> bool;
}

/// Tunables for the work streak walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakPolicy {
    /// Fraction of a day's tasks that must be completed for the day to qualify
    #[serde(default = "default_threshold")]
    pub completion_threshold: f64,
    /// Skipping empty days stops once the cursor is this far before today
    #[serde(default = "default_skip_lookback")]
    pub skip_lookback_days: i64,
    /// Absolute bound on how far back the walk may go
    #[serde(default = "default_max_lookback")]
    pub max_lookback_days: i64,
}

fn default_threshold() -> f64 {
    0.75
}

fn default_skip_lookback() -> i64 {
    30
}

fn default_max_lookback() -> i64 {
    365
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            completion_threshold: default_threshold(),
            skip_lookback_days: default_skip_lookback(),
            max_lookback_days: default_max_lookback(),
        }
    }
}

/// Assigned vs completed count for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounts {
    pub assigned: usize,
    pub completed: usize,
}

impl DayCounts {
    pub fn record(&mut self, completed: bool) {
        self.assigned += 1;
        if completed {
            self.completed += 1;
        }
    }

    /// Completion rate (0.0 - 1.0); zero when nothing was assigned
    pub fn rate(&self) -> f64 {
        if self.assigned == 0 {
            0.0
        } else {
            self.completed as f64 / self.assigned as f64
        }
    }
}

/// Consecutive days with a completed record.
///
/// Zero when nothing is completed on or before today, or when the latest
/// completed day is older than yesterday. Otherwise counts back from the latest
/// completed day until the first missing day.
pub fn gym_streak<R: DailyRecord>(logs: &[R], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = logs
        .iter()
        .filter(|log| log.is_completed() && log.day() <= today)
        .map(DailyRecord::day)
        .collect();
    days.sort_unstable_by(|a, b| b.cmp(a));

    let Some(&most_recent) = days.first() else {
        return 0;
    };
    if most_recent < add_days(today, -1) {
        return 0;
    }

    let mut streak = 0;
    let mut expected = most_recent;
    for day in days {
        if day == expected {
            streak += 1;
            expected = add_days(expected, -1);
        } else if day < expected {
            break;
        }
        // day > expected: duplicate of a day already counted
    }
    streak
}

/// Work streak with the default policy (75% threshold, 30/365 day bounds)
pub fn work_streak<R: DailyRecord>(tasks: &[R], today: NaiveDate) -> u32 {
    work_streak_with(tasks, today, &StreakPolicy::default())
}

/// Work streak: walk back from today, one day at a time.
///
/// - a day with no tasks is skipped; the walk breaks once skipping moves the
///   cursor more than `skip_lookback_days` before today
/// - a day at or above the threshold qualifies; the first qualifying day is
///   day 0 and adds nothing, each later one adds 1
/// - a day below the threshold ends the walk
/// - the walk never goes more than `max_lookback_days` back
pub fn work_streak_with<R: DailyRecord>(tasks: &[R], today: NaiveDate, policy: &StreakPolicy) -> u32 {
    let by_day = counts_by_day(tasks.iter().filter(|t| t.day() <= today));
    if by_day.is_empty() {
        return 0;
    }

    let mut streak = 0;
    let mut cursor = today;
    let mut baseline_found = false;

    loop {
        match by_day.get(&cursor) {
            None => {
                cursor = add_days(cursor, -1);
                if days_between(cursor, today) > policy.skip_lookback_days {
                    break;
                }
                continue;
            }
            Some(counts) if counts.rate() >= policy.completion_threshold => {
                if baseline_found {
                    streak += 1;
                }
                baseline_found = true;
                cursor = add_days(cursor, -1);
            }
            Some(_) => break,
        }

        if days_between(cursor, today) > policy.max_lookback_days {
            break;
        }
    }

    streak
}

/// Assigned/completed counts keyed by day
pub fn counts_by_day<'a, R, I>(records: I) -> HashMap<NaiveDate, DayCounts>
where
    R: DailyRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut by_day: HashMap<NaiveDate, DayCounts> = HashMap::new();
    for record in records {
        by_day.entry(record.day()).or_default().record(record.is_completed());
    }
    by_day
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry(NaiveDate, bool);

    impl DailyRecord for Entry {
        fn day(&self) -> NaiveDate {
            self.0
        }
        fn is_completed(&self) -> bool {
            self.1
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn ago(n: i64) -> NaiveDate {
        add_days(today(), -n)
    }

    #[test]
    fn test_empty_streaks() {
        let none: Vec<Entry> = vec![];
        assert_eq!(gym_streak(&none, today()), 0);
        assert_eq!(work_streak(&none, today()), 0);
    }

    #[test]
    fn test_gym_streak_ignores_incomplete_and_future() {
        let logs = vec![
            Entry(ago(-1), true),
            Entry(ago(0), false),
            Entry(ago(1), true),
            Entry(ago(2), true),
        ];
        assert_eq!(gym_streak(&logs, today()), 2);
    }

    #[test]
    fn test_gym_streak_tolerates_duplicates() {
        let logs = vec![Entry(ago(0), true), Entry(ago(0), true), Entry(ago(1), true)];
        assert_eq!(gym_streak(&logs, today()), 2);
    }

    #[test]
    fn test_day_counts_rate() {
        let mut c = DayCounts::default();
        assert_eq!(c.rate(), 0.0);
        c.record(true);
        c.record(false);
        assert_eq!(c.rate(), 0.5);
    }

    #[test]
    fn test_policy_threshold_override() {
        let tasks = vec![
            Entry(ago(0), true),
            Entry(ago(0), false),
            Entry(ago(1), true),
            Entry(ago(1), false),
            Entry(ago(2), true),
        ];
        assert_eq!(work_streak(&tasks, today()), 0);
        let lenient = StreakPolicy {
            completion_threshold: 0.5,
            ..StreakPolicy::default()
        };
        assert_eq!(work_streak_with(&tasks, today(), &lenient), 2);
    }
}
