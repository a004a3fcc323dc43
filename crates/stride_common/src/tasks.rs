//! Daily tasks: ordering, scheduling window, and dashboard counts.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::buckets::group_by_day;
use crate::calendar::{day_key, weekday_label, DayRange};
use crate::error::{Result, StrideError};
use crate::streaks::{counts_by_day, DailyRecord, DayCounts};

/// Tasks may be scheduled this many months either side of today
pub const SCHEDULE_WINDOW_MONTHS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(StrideError::InvalidArgument(format!("unknown priority: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar day, local
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Per-day rank; reordering swaps values instead of renumbering
    #[serde(default)]
    pub order: i64,
}

impl DailyRecord for Task {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}

/// One day of the weekly chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTaskSummary {
    pub date: String,
    pub day: String,
    pub assigned: usize,
    pub completed: usize,
}

/// Order for a new task appended to `user_id`'s list on `day`
pub fn next_order(tasks: &[Task], user_id: &str, day: NaiveDate) -> i64 {
    tasks
        .iter()
        .filter(|t| t.user_id == user_id && t.date == day)
        .map(|t| t.order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Swap the order values of two tasks
pub fn swap_order(a: &mut Task, b: &mut Task) {
    std::mem::swap(&mut a.order, &mut b.order);
}

/// Swap the order values of the tasks with ids `first` and `second`
pub fn swap_tasks(tasks: &mut [Task], first: &str, second: &str) -> Result<()> {
    let i = position(tasks, first)?;
    let j = position(tasks, second)?;
    if i == j {
        return Ok(());
    }
    let (lo, hi) = (i.min(j), i.max(j));
    let (head, tail) = tasks.split_at_mut(hi);
    swap_order(&mut head[lo], &mut tail[0]);
    Ok(())
}

fn position(tasks: &[Task], id: &str) -> Result<usize> {
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| StrideError::TaskNotFound(id.to_string()))
}

/// Reject days more than `months` months before or after today
pub fn validate_schedule_window(day: NaiveDate, today: NaiveDate, months: u32) -> Result<()> {
    let window = Months::new(months);
    let earliest = today.checked_sub_months(window).unwrap_or(NaiveDate::MIN);
    let latest = today.checked_add_months(window).unwrap_or(NaiveDate::MAX);
    if day < earliest || day > latest {
        return Err(StrideError::DateOutOfWindow { date: day, months });
    }
    Ok(())
}

/// Tasks on one day sorted by order
pub fn tasks_on(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    let mut on_day: Vec<&Task> = tasks.iter().filter(|t| t.date == day).collect();
    on_day.sort_by_key(|t| t.order);
    on_day
}

/// Day key -> tasks sorted by order, for every day in range
pub fn tasks_by_day<'a>(tasks: &'a [Task], range: &DayRange) -> BTreeMap<String, Vec<&'a Task>> {
    let mut groups = group_by_day(tasks, range);
    for day in groups.values_mut() {
        day.sort_by_key(|t| t.order);
    }
    groups
}

/// Assigned and completed counts for one day
pub fn day_counts(tasks: &[Task], day: NaiveDate) -> DayCounts {
    let mut counts = DayCounts::default();
    for task in tasks.iter().filter(|t| t.date == day) {
        counts.record(task.completed);
    }
    counts
}

/// Completed tasks across all days
pub fn completed_total(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.completed).count()
}

/// Last seven days ending today, oldest first
pub fn weekly_task_stats(tasks: &[Task], today: NaiveDate) -> Vec<DayTaskSummary> {
    let range = DayRange::trailing(today, 7);
    let by_day = counts_by_day(tasks.iter().filter(|t| range.contains(t.date)));

    range
        .days()
        .map(|day| {
            let counts = by_day.get(&day).copied().unwrap_or_default();
            DayTaskSummary {
                date: day_key(day),
                day: weekday_label(day).to_string(),
                assigned: counts.assigned,
                completed: counts.completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, user: &str, date: NaiveDate, order: i64, completed: bool) -> Task {
        Task {
            id: id.into(),
            user_id: user.into(),
            title: format!("task {}", id),
            description: String::new(),
            date,
            completed,
            priority: Priority::default(),
            order,
        }
    }

    #[test]
    fn test_next_order() {
        let day = d(2024, 5, 1);
        let tasks = vec![
            task("a", "u1", day, 0, false),
            task("b", "u1", day, 4, false),
            task("c", "u2", day, 9, false),
            task("d", "u1", d(2024, 5, 2), 7, false),
        ];
        assert_eq!(next_order(&tasks, "u1", day), 5);
        assert_eq!(next_order(&tasks, "u1", d(2024, 5, 3)), 0);
    }

    #[test]
    fn test_swap_order() {
        let day = d(2024, 5, 1);
        let mut a = task("a", "u1", day, 0, false);
        let mut b = task("b", "u1", day, 3, false);
        swap_order(&mut a, &mut b);
        assert_eq!((a.order, b.order), (3, 0));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(" High ".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_swap_tasks_by_id() {
        let day = d(2024, 5, 1);
        let mut tasks = vec![
            task("a", "u1", day, 0, false),
            task("b", "u1", day, 1, false),
            task("c", "u1", day, 2, false),
        ];
        swap_tasks(&mut tasks, "c", "a").unwrap();
        let orders: Vec<_> = tasks.iter().map(|t| t.order).collect();
        assert_eq!(orders, [2, 1, 0]);
        assert!(matches!(
            swap_tasks(&mut tasks, "a", "zzz"),
            Err(StrideError::TaskNotFound(id)) if id == "zzz"
        ));
    }

    #[test]
    fn test_tasks_by_day_sorted() {
        let tasks = vec![
            task("late", "u1", d(2024, 5, 1), 3, false),
            task("early", "u1", d(2024, 5, 1), 1, false),
        ];
        let range = DayRange::month(2024, 5).unwrap();
        let groups = tasks_by_day(&tasks, &range);
        assert_eq!(groups.len(), 31);
        let ids: Vec<_> = groups["2024-05-01"].iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[test]
    fn test_schedule_window() {
        let today = d(2024, 5, 31);
        assert!(validate_schedule_window(d(2024, 2, 29), today, 3).is_ok());
        assert!(validate_schedule_window(d(2024, 8, 31), today, 3).is_ok());
        let err = validate_schedule_window(d(2024, 9, 1), today, 3).unwrap_err();
        assert!(matches!(err, StrideError::DateOutOfWindow { months: 3, .. }));
        assert!(validate_schedule_window(d(2024, 2, 28), today, 3).is_err());
    }

    #[test]
    fn test_day_counts_and_order() {
        let day = d(2024, 5, 1);
        let tasks = vec![
            task("a", "u1", day, 2, true),
            task("b", "u1", day, 1, false),
            task("c", "u1", d(2024, 5, 2), 0, true),
        ];
        let counts = day_counts(&tasks, day);
        assert_eq!((counts.assigned, counts.completed), (2, 1));
        assert_eq!(completed_total(&tasks), 2);
        let ids: Vec<_> = tasks_on(&tasks, day).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_weekly_stats() {
        let today = d(2024, 9, 7);
        let tasks = vec![
            task("a", "u1", today, 0, true),
            task("b", "u1", today, 1, false),
            task("c", "u1", d(2024, 9, 1), 0, true),
            task("old", "u1", d(2024, 8, 31), 0, true),
        ];
        let week = weekly_task_stats(&tasks, today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, "2024-09-01");
        assert_eq!(week[0].day, "Sun");
        assert_eq!((week[0].assigned, week[0].completed), (1, 1));
        assert_eq!((week[6].assigned, week[6].completed), (2, 1));
        assert_eq!(week[3].assigned, 0);
    }

    #[test]
    fn test_task_json_defaults() {
        let json = r#"{"id":"t1","user_id":"u1","title":"Read","date":"2024-05-01"}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.completed);
        assert_eq!(t.order, 0);
    }
}
