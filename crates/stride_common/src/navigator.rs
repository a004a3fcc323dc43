//! Resolve (step, topic, problem) index triples inside a progress tree.
//!
//! Lookup always matches the stored index field at each level. Array position
//! is not identity: a curriculum edit can reorder or resize any level.

use crate::error::{Level, Result, StrideError};
use crate::progress::{Progress, ProgressProblem};

/// A located problem plus the names of its parents
#[derive(Debug)]
pub struct Located<'a> {
    pub step_index: usize,
    pub step_name: &'a str,
    pub topic_index: usize,
    pub topic_name: &'a str,
    pub problem: &'a mut ProgressProblem,
}

/// Validate a raw index: must be a non-negative integer
pub fn ensure_index(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| StrideError::InvalidIndex(value.to_string()))
}

/// Validate an index given as text (query strings, CLI arguments)
pub fn parse_index(raw: &str) -> Result<usize> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| StrideError::InvalidIndex(raw.to_string()))?;
    ensure_index(value)
}

/// Find a problem by stored indices, borrowing it mutably from the tree.
///
/// Callers mutate `problem` in place and then persist the whole tree.
pub fn locate(
    progress: &mut Progress,
    step_index: i64,
    topic_index: i64,
    problem_index: i64,
) -> Result<Located<'_>> {
    let step_index = ensure_index(step_index)?;
    let topic_index = ensure_index(topic_index)?;
    let problem_index = ensure_index(problem_index)?;

    let step = progress
        .steps
        .iter_mut()
        .find(|s| s.step_index == step_index)
        .ok_or_else(|| StrideError::not_found(Level::Step, step_index))?;

    let topic = step
        .topics
        .iter_mut()
        .find(|t| t.topic_index == topic_index)
        .ok_or_else(|| StrideError::not_found_in(Level::Topic, topic_index, Level::Step, step_index))?;

    let problem = topic
        .problems
        .iter_mut()
        .find(|p| p.problem_index == problem_index)
        .ok_or_else(|| {
            StrideError::not_found_in(Level::Problem, problem_index, Level::Topic, topic_index)
        })?;

    Ok(Located {
        step_index,
        step_name: &step.name,
        topic_index,
        topic_name: &topic.name,
        problem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Difficulty;
    use crate::progress::{ProgressStep, ProgressTopic};
    use std::collections::VecDeque;

    fn leaf(problem_index: usize) -> ProgressProblem {
        ProgressProblem {
            problem_index,
            name: format!("p{}", problem_index),
            difficulty: Difficulty::Easy,
            external_link: String::new(),
            completed: false,
            completed_at: None,
            code: String::new(),
            code_language: "cpp".into(),
            notes: String::new(),
            revisions: VecDeque::new(),
        }
    }

    /// Steps stored out of array order, as after a partial curriculum edit
    fn shuffled() -> Progress {
        Progress {
            steps: vec![
                ProgressStep {
                    step_index: 2,
                    name: "Graphs".into(),
                    topics: vec![ProgressTopic {
                        topic_index: 0,
                        name: "BFS".into(),
                        problems: vec![leaf(1), leaf(0)],
                    }],
                },
                ProgressStep {
                    step_index: 0,
                    name: "Basics".into(),
                    topics: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_locate_matches_stored_index_not_position() {
        let mut p = shuffled();
        let found = locate(&mut p, 2, 0, 0).unwrap();
        assert_eq!(found.step_name, "Graphs");
        assert_eq!(found.topic_name, "BFS");
        assert_eq!(found.problem.problem_index, 0);
        assert_eq!(found.problem.name, "p0");
    }

    #[test]
    fn test_locate_mutation_is_visible() {
        let mut p = shuffled();
        locate(&mut p, 2, 0, 1).unwrap().problem.notes = "edited".into();
        assert_eq!(p.steps[0].topics[0].problems[0].notes, "edited");
    }

    #[test]
    fn test_locate_not_found_names_level() {
        let mut p = shuffled();
        let err = locate(&mut p, 1, 0, 0).unwrap_err();
        assert_eq!(err.to_string(), "step 1 not found");

        let err = locate(&mut p, 0, 0, 0).unwrap_err();
        assert_eq!(err.to_string(), "topic 0 not found in step 0");

        let err = locate(&mut p, 2, 0, 5).unwrap_err();
        assert!(matches!(err, StrideError::NotFound { level: Level::Problem, index: 5, .. }));
    }

    #[test]
    fn test_negative_index_is_invalid() {
        let mut p = shuffled();
        assert!(matches!(locate(&mut p, -1, 0, 0), Err(StrideError::InvalidIndex(_))));
        assert!(matches!(parse_index("1.5"), Err(StrideError::InvalidIndex(_))));
        assert!(matches!(parse_index("abc"), Err(StrideError::InvalidIndex(_))));
        assert_eq!(parse_index(" 3 ").unwrap(), 3);
    }
}
