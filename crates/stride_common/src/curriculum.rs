//! Read-only curriculum (v0.1.0).
//!
//! A curriculum is an ordered tree of steps, topics and problems. Every node
//! carries its own zero-based index; those stored indices are the only way
//! progress trees refer back into the curriculum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StrideError};

/// Problem difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(StrideError::InvalidArgument(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = StrideError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_index: usize,
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub external_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_index: usize,
    pub name: String,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_index: usize,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Step {
    pub fn problem_count(&self) -> usize {
        self.topics.iter().map(|t| t.problems.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    /// Stable identifier used to key progress documents
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Per-step line of the curriculum overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOverview {
    pub step_index: usize,
    pub step_name: String,
    pub total_problems: usize,
}

/// Curriculum overview for listing screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumOverview {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_steps: usize,
    pub total_problems: usize,
    pub steps: Vec<StepOverview>,
}

impl Curriculum {
    /// Build from an import document, assigning indices by position
    pub fn from_structure(raw: CourseStructure) -> Result<Self> {
        if raw.course_name.trim().is_empty() {
            return Err(StrideError::InvalidArgument(
                "course_name is required".to_string(),
            ));
        }

        let mut steps = Vec::with_capacity(raw.steps.len());
        for (step_index, step) in raw.steps.into_iter().enumerate() {
            let mut topics = Vec::with_capacity(step.topics.len());
            for (topic_index, topic) in step.topics.into_iter().enumerate() {
                let problems = topic
                    .problems
                    .into_iter()
                    .enumerate()
                    .map(|(problem_index, p)| {
                        Ok(Problem {
                            problem_index,
                            name: p.problem_name,
                            difficulty: p.difficulty.parse()?,
                            external_link: p.leetcode_link.unwrap_or_default(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                topics.push(Topic {
                    topic_index,
                    name: topic.topic_name,
                    problems,
                });
            }
            steps.push(Step {
                step_index,
                name: step.step_name,
                topics,
            });
        }

        Ok(Self {
            id: slugify(&raw.course_name),
            name: raw.course_name,
            description: raw.description,
            steps,
        })
    }

    /// Parse an import document from JSON
    pub fn from_structure_json(json: &str) -> Result<Self> {
        let raw: CourseStructure = serde_json::from_str(json)?;
        Self::from_structure(raw)
    }

    /// Step by its stored index field
    pub fn step(&self, step_index: usize) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_index == step_index)
    }

    pub fn total_problems(&self) -> usize {
        self.steps.iter().map(Step::problem_count).sum()
    }

    pub fn overview(&self) -> CurriculumOverview {
        CurriculumOverview {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            total_steps: self.steps.len(),
            total_problems: self.total_problems(),
            steps: self
                .steps
                .iter()
                .map(|s| StepOverview {
                    step_index: s.step_index,
                    step_name: s.name.clone(),
                    total_problems: s.problem_count(),
                })
                .collect(),
        }
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

// === Import document ===

/// Course structure as exported by the curriculum authoring tool
#[derive(Debug, Clone, Deserialize)]
pub struct CourseStructure {
    pub course_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStep {
    pub step_name: String,
    #[serde(default)]
    pub topics: Vec<RawTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTopic {
    pub topic_name: String,
    #[serde(default)]
    pub problems: Vec<RawProblem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProblem {
    pub problem_name: String,
    pub difficulty: String,
    #[serde(default)]
    pub leetcode_link: Option<String>,
}
