//! Workout templates and per-day workout logs.
//!
//! At most one log exists per (user, day); `upsert_log` keeps it that way.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buckets::trailing_window;
use crate::calendar::weekday_day_label;
use crate::streaks::DailyRecord;

/// Days covered by the monthly activity chart
pub const MONTHLY_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    /// Sets of reps (bench press)
    Count,
    /// Duration in minutes (running)
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Warmup,
    #[default]
    Main,
    Cardio,
}

/// Exercise as planned in a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub kind: ExerciseKind,
    #[serde(default)]
    pub category: ExerciseCategory,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub default_sets: Option<u32>,
    #[serde(default)]
    pub default_reps: Option<u32>,
    #[serde(default)]
    pub default_weight: Option<f64>,
    #[serde(default)]
    pub default_minutes: Option<f64>,
}

/// Named workout plan ("Push day")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl WorkoutTemplate {
    /// Next order value within a category
    pub fn next_exercise_order(&self, category: ExerciseCategory) -> i64 {
        self.exercises
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.order)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Append an exercise at the end of its category
    pub fn add_exercise(&mut self, mut exercise: Exercise) {
        exercise.order = self.next_exercise_order(exercise.category);
        self.exercises.push(exercise);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Exercise as actually performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformedExercise {
    pub name: String,
    pub kind: ExerciseKind,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
    #[serde(default)]
    pub minutes: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub user_id: String,
    /// Calendar day, local
    pub date: NaiveDate,
    pub workout_template_ref: String,
    #[serde(default)]
    pub performed_exercises: Vec<PerformedExercise>,
    #[serde(default)]
    pub completed: bool,
}

impl DailyRecord for WorkoutLog {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Fields written by an upsert
#[derive(Debug, Clone)]
pub struct LogUpdate {
    pub workout_template_ref: String,
    pub performed_exercises: Vec<PerformedExercise>,
    /// `None` keeps the stored value (false for a new log)
    pub completed: Option<bool>,
}

/// Update the (user, day) log or insert a new one. Returns the log and whether it was created.
pub fn upsert_log<'a>(
    logs: &'a mut Vec<WorkoutLog>,
    user_id: &str,
    date: NaiveDate,
    update: LogUpdate,
    new_id: impl FnOnce() -> String,
) -> (&'a mut WorkoutLog, bool) {
    if let Some(pos) = logs.iter().position(|l| l.user_id == user_id && l.date == date) {
        let log = &mut logs[pos];
        log.workout_template_ref = update.workout_template_ref;
        log.performed_exercises = update.performed_exercises;
        if let Some(completed) = update.completed {
            log.completed = completed;
        }
        debug!("Updated workout log {} for {} on {}", log.id, user_id, date);
        return (log, false);
    }

    logs.push(WorkoutLog {
        id: new_id(),
        user_id: user_id.to_string(),
        date,
        workout_template_ref: update.workout_template_ref,
        performed_exercises: update.performed_exercises,
        completed: update.completed.unwrap_or(false),
    });
    let last = logs.len() - 1;
    debug!("Created workout log for {} on {}", user_id, date);
    (&mut logs[last], true)
}

/// Completed sessions in a calendar month
pub fn completed_in_month(logs: &[WorkoutLog], year: i32, month: u32) -> usize {
    logs.iter()
        .filter(|l| l.completed && l.date.year() == year && l.date.month() == month)
        .count()
}

/// One day of the monthly activity chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymDaySummary {
    pub date: String,
    /// e.g. "Sun 5"
    pub day: String,
    pub completed: bool,
    pub workout_name: Option<String>,
    /// A log exists for the day, completed or not
    pub assigned: bool,
}

/// Last 30 days ending today, oldest first
pub fn monthly_gym_stats(
    logs: &[WorkoutLog],
    templates: &[WorkoutTemplate],
    today: NaiveDate,
) -> Vec<GymDaySummary> {
    trailing_window(logs, today, MONTHLY_WINDOW_DAYS)
        .into_iter()
        .map(|slot| {
            let workout_name = slot.record.and_then(|log| {
                templates
                    .iter()
                    .find(|t| t.id == log.workout_template_ref)
                    .map(|t| t.name.clone())
            });
            GymDaySummary {
                day: weekday_day_label(slot.date),
                date: slot.key,
                completed: slot.record.map_or(false, |log| log.completed),
                workout_name,
                assigned: slot.record.is_some(),
            }
        })
        .collect()
}
