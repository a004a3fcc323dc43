//! Per-user progress tree and its mutations (v0.1.0).
//!
//! A progress tree mirrors the curriculum's step/topic/problem index space.
//! Leaves carry the mutable tracking state: completion, saved code, notes and
//! a bounded revision history (newest first).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

use crate::curriculum::{Curriculum, Difficulty};
use crate::error::{Result, StrideError};

/// Code language assigned to freshly cloned problems
pub const DEFAULT_CODE_LANGUAGE: &str = "cpp";

/// Revisions kept per problem
pub const REVISION_CAP: usize = 50;

/// Revisions returned when the caller gives no limit
pub const REVISION_LIST_DEFAULT: usize = 10;

/// Self-assessment recorded with a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    #[default]
    Solid,
    NeedsReview,
}

impl RevisionStatus {
    /// Anything other than "needs_review" is recorded as solid
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "needs_review" => RevisionStatus::NeedsReview,
            _ => RevisionStatus::Solid,
        }
    }
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionStatus::Solid => write!(f, "solid"),
            RevisionStatus::NeedsReview => write!(f, "needs_review"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub revised_at: DateTime<Utc>,
    pub status: RevisionStatus,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressProblem {
    pub problem_index: usize,
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub external_link: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_code_language")]
    pub code_language: String,
    #[serde(default)]
    pub notes: String,
    /// Newest first
    #[serde(default)]
    pub revisions: VecDeque<Revision>,
}

fn default_code_language() -> String {
    DEFAULT_CODE_LANGUAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressTopic {
    pub topic_index: usize,
    pub name: String,
    #[serde(default)]
    pub problems: Vec<ProgressProblem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub step_index: usize,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<ProgressTopic>,
}

/// Mutable tracking copy of a curriculum
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub steps: Vec<ProgressStep>,
}

impl Progress {
    /// Project a curriculum into a fresh tree with every leaf untouched
    pub fn from_curriculum(curriculum: &Curriculum, code_language: &str) -> Self {
        let steps = curriculum
            .steps
            .iter()
            .map(|step| ProgressStep {
                step_index: step.step_index,
                name: step.name.clone(),
                topics: step
                    .topics
                    .iter()
                    .map(|topic| ProgressTopic {
                        topic_index: topic.topic_index,
                        name: topic.name.clone(),
                        problems: topic
                            .problems
                            .iter()
                            .map(|problem| ProgressProblem {
                                problem_index: problem.problem_index,
                                name: problem.name.clone(),
                                difficulty: problem.difficulty,
                                external_link: problem.external_link.clone(),
                                completed: false,
                                completed_at: None,
                                code: String::new(),
                                code_language: code_language.to_string(),
                                notes: String::new(),
                                revisions: VecDeque::new(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { steps }
    }

    /// Every leaf with its step and topic, in tree order
    pub fn problems(&self) -> impl Iterator<Item = (&ProgressStep, &ProgressTopic, &ProgressProblem)> {
        self.steps.iter().flat_map(|step| {
            step.topics.iter().flat_map(move |topic| {
                topic.problems.iter().map(move |problem| (step, topic, problem))
            })
        })
    }

    pub fn problem_count(&self) -> usize {
        self.problems().count()
    }
}

/// Clone a curriculum into a new progress tree.
///
/// Fails with `InvalidArgument` when no curriculum is available; callers treat
/// that as "not initialized" rather than as empty progress.
pub fn clone_curriculum(curriculum: Option<&Curriculum>, code_language: &str) -> Result<Progress> {
    let curriculum = curriculum
        .ok_or_else(|| StrideError::InvalidArgument("curriculum not provided".to_string()))?;
    let progress = Progress::from_curriculum(curriculum, code_language);
    debug!(
        "Cloned curriculum {} into {} steps, {} problems",
        curriculum.id,
        progress.steps.len(),
        progress.problem_count()
    );
    Ok(progress)
}

impl ProgressProblem {
    /// Toggle completion, stamping or clearing the completion time
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }

    /// Save code, language and notes; absent fields are left alone
    pub fn save_code(&mut self, code: Option<&str>, language: Option<&str>, notes: Option<&str>) {
        if let Some(code) = code {
            self.code = code.to_string();
        }
        if let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) {
            self.code_language = language.to_string();
        }
        if let Some(notes) = notes {
            self.notes = notes.to_string();
        }
    }

    /// Record a revision at the front, dropping the oldest beyond `cap`.
    ///
    /// `cap` never exceeds `REVISION_CAP`.
    pub fn add_revision(
        &mut self,
        status: RevisionStatus,
        note: &str,
        revised_at: DateTime<Utc>,
        cap: usize,
    ) -> &Revision {
        self.revisions.push_front(Revision {
            revised_at,
            status,
            note: note.trim().to_string(),
        });
        let cap = cap.clamp(1, REVISION_CAP);
        if self.revisions.len() > cap {
            let dropped = self.revisions.len() - cap;
            self.revisions.truncate(cap);
            debug!(
                "Revision history of problem {} over cap {}, dropped {} oldest",
                self.problem_index, cap, dropped
            );
        }
        &self.revisions[0]
    }

    /// Latest revisions, newest first. Zero or absent limit means `default`.
    pub fn recent_revisions(&self, limit: Option<usize>, default: usize) -> Vec<&Revision> {
        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => default,
        }
        .clamp(1, REVISION_CAP);
        self.revisions.iter().take(limit).collect()
    }

    pub fn latest_revision(&self) -> Option<&Revision> {
        self.revisions.front()
    }
}
