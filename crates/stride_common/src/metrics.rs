//! Progress metrics rollup (v0.1.0).
//!
//! Totals come from the curriculum; completion and revision figures come from
//! one walk over the progress tree. Percentages use round(ratio * 1000) / 10,
//! i.e. one decimal place, which fixtures depend on exactly.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::curriculum::{Curriculum, Difficulty};
use crate::progress::{Progress, RevisionStatus};

/// Window for "recent" revisions
pub const RECENT_REVISION_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    pub step_index: usize,
    pub step_name: String,
    pub total: usize,
    pub completed: usize,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMetrics {
    pub difficulty: Difficulty,
    pub total: usize,
    pub completed: usize,
    pub percentage: f64,
}

/// Most recently completed problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastCompleted {
    pub problem_name: String,
    pub topic_name: String,
    pub step_name: String,
    pub completed_at: DateTime<Utc>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionMetrics {
    pub total: usize,
    pub recent_7_days: usize,
    /// Counted across every stored revision, not only the latest per problem
    pub needs_review: usize,
    pub last: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_problems: usize,
    pub completed_problems: usize,
    pub remaining_problems: usize,
    pub completion_percentage: f64,
    /// Ascending by step index
    pub steps: Vec<StepMetrics>,
    /// In the order difficulties first appear in the curriculum
    pub difficulty: Vec<DifficultyMetrics>,
    pub last_completed: Option<LastCompleted>,
    pub revisions: RevisionMetrics,
}

/// Percentage with one decimal: round(part / whole * 1000) / 10
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}

/// Curriculum-side totals, built in one pass
struct CurriculumTotals {
    total_problems: usize,
    difficulty_totals: Vec<(Difficulty, usize)>,
    step_totals: HashMap<usize, usize>,
}

impl CurriculumTotals {
    fn build(curriculum: &Curriculum) -> Self {
        let mut total_problems = 0;
        let mut difficulty_totals: Vec<(Difficulty, usize)> = Vec::new();
        let mut step_totals = HashMap::new();

        for step in &curriculum.steps {
            let mut in_step = 0;
            for problem in step.topics.iter().flat_map(|t| &t.problems) {
                in_step += 1;
                match difficulty_totals.iter_mut().find(|(d, _)| *d == problem.difficulty) {
                    Some((_, count)) => *count += 1,
                    None => difficulty_totals.push((problem.difficulty, 1)),
                }
            }
            total_problems += in_step;
            *step_totals.entry(step.step_index).or_insert(0) += in_step;
        }

        Self {
            total_problems,
            difficulty_totals,
            step_totals,
        }
    }
}

/// Roll up a progress tree against its curriculum.
///
/// `now` anchors the recent-revision window.
pub fn compute_metrics(progress: &Progress, curriculum: &Curriculum, now: DateTime<Utc>) -> Metrics {
    let totals = CurriculumTotals::build(curriculum);
    let recent_cutoff = now - Duration::days(RECENT_REVISION_DAYS);

    let mut completed_problems = 0;
    let mut difficulty_completed: HashMap<Difficulty, usize> = HashMap::new();
    let mut steps = Vec::with_capacity(progress.steps.len());
    let mut last_completed: Option<LastCompleted> = None;
    let mut revisions = RevisionMetrics::default();

    for step in &progress.steps {
        let total = totals.step_totals.get(&step.step_index).copied().unwrap_or(0);
        let mut completed = 0;

        for topic in &step.topics {
            for problem in &topic.problems {
                for revision in &problem.revisions {
                    revisions.total += 1;
                    if revision.revised_at >= recent_cutoff {
                        revisions.recent_7_days += 1;
                    }
                    if revision.status == RevisionStatus::NeedsReview {
                        revisions.needs_review += 1;
                    }
                    if revisions.last.map_or(true, |last| revision.revised_at > last) {
                        revisions.last = Some(revision.revised_at);
                    }
                }

                if !problem.completed {
                    continue;
                }
                completed += 1;
                *difficulty_completed.entry(problem.difficulty).or_insert(0) += 1;

                if let Some(completed_at) = problem.completed_at {
                    // Later encounter wins ties
                    let newer = last_completed
                        .as_ref()
                        .map_or(true, |last| completed_at >= last.completed_at);
                    if newer {
                        last_completed = Some(LastCompleted {
                            problem_name: problem.name.clone(),
                            topic_name: topic.name.clone(),
                            step_name: step.name.clone(),
                            completed_at,
                            difficulty: problem.difficulty,
                        });
                    }
                }
            }
        }

        completed_problems += completed;
        steps.push(StepMetrics {
            step_index: step.step_index,
            step_name: step.name.clone(),
            total,
            completed,
            completion_percentage: percentage(completed, total),
        });
    }

    steps.sort_by_key(|s| s.step_index);

    let difficulty = totals
        .difficulty_totals
        .iter()
        .map(|&(difficulty, total)| {
            let completed = difficulty_completed.get(&difficulty).copied().unwrap_or(0);
            DifficultyMetrics {
                difficulty,
                total,
                completed,
                percentage: percentage(completed, total),
            }
        })
        .collect();

    Metrics {
        total_problems: totals.total_problems,
        completed_problems,
        remaining_problems: totals.total_problems.saturating_sub(completed_problems),
        completion_percentage: percentage(completed_problems, totals.total_problems),
        steps,
        difficulty,
        last_completed,
        revisions,
    }
}

/// Metrics when either side may be missing.
///
/// `None` means "not initialized yet", which callers must not read as zero progress.
pub fn metrics_for(
    progress: Option<&Progress>,
    curriculum: Option<&Curriculum>,
    now: DateTime<Utc>,
) -> Option<Metrics> {
    match (progress, curriculum) {
        (Some(progress), Some(curriculum)) => Some(compute_metrics(progress, curriculum, now)),
        _ => None,
    }
}
