//! Shared types and analytics for Stride components.
//! v0.1.0: Curriculum clone, navigator, metrics, streaks.
//! v0.2.0: File-backed progress store, solved CSV export.
//! v0.3.0: Workout templates, weekly/monthly dashboard summaries.
//! v0.4.0: TOML configuration.

pub mod buckets;
pub mod calendar;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod export;
pub mod metrics;
pub mod navigator;
pub mod progress;
pub mod store;
pub mod streaks;
pub mod tasks;
pub mod workouts;

pub use config::StrideConfig;
pub use curriculum::{Curriculum, Difficulty};
pub use error::{Level, Result, StrideError};
pub use metrics::{compute_metrics, metrics_for, Metrics};
pub use navigator::{locate, Located};
pub use progress::{clone_curriculum, Progress, ProgressProblem, Revision, RevisionStatus};
pub use store::{ProgressDocument, ProgressStore};
pub use streaks::{gym_streak, work_streak, work_streak_with, DailyRecord, StreakPolicy};
pub use tasks::Task;
pub use workouts::{WorkoutLog, WorkoutTemplate};
