//! Error types for Stride.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Level of the progress tree an index addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Step,
    Topic,
    Problem,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Step => write!(f, "step"),
            Level::Topic => write!(f, "topic"),
            Level::Problem => write!(f, "problem"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StrideError {
    /// Required input missing; callers treat this as "not initialized"
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid index value: {0}")]
    InvalidIndex(String),

    #[error("{level} {index} not found{context}")]
    NotFound {
        level: Level,
        index: usize,
        /// Parent path, e.g. " in step 2"
        context: String,
    },

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Date {date} must be within {months} months in the past or future")]
    DateOutOfWindow { date: NaiveDate, months: u32 },

    #[error("Document {path} belongs to {user_id} on {curriculum_id}")]
    OwnerMismatch {
        path: String,
        user_id: String,
        curriculum_id: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StrideError {
    pub(crate) fn not_found(level: Level, index: usize) -> Self {
        StrideError::NotFound {
            level,
            index,
            context: String::new(),
        }
    }

    pub(crate) fn not_found_in(level: Level, index: usize, parent: Level, parent_index: usize) -> Self {
        StrideError::NotFound {
            level,
            index,
            context: format!(" in {} {}", parent, parent_index),
        }
    }

    /// HTTP-class status for collaborators that expose the core over a network
    pub fn code(&self) -> u16 {
        match self {
            StrideError::InvalidArgument(_) => 400,
            StrideError::InvalidIndex(_) => 400,
            StrideError::NotFound { .. } => 404,
            StrideError::TaskNotFound(_) => 404,
            StrideError::InvalidDate(_) => 400,
            StrideError::DateOutOfWindow { .. } => 400,
            StrideError::OwnerMismatch { .. } => 500,
            StrideError::Io(_) => 500,
            StrideError::Json(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, StrideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_level() {
        let err = StrideError::not_found_in(Level::Topic, 4, Level::Step, 1);
        assert_eq!(err.to_string(), "topic 4 not found in step 1");
        assert_eq!(err.code(), 404);
    }

    #[test]
    fn test_codes() {
        assert_eq!(StrideError::InvalidIndex("-1".into()).code(), 400);
        assert_eq!(StrideError::not_found(Level::Step, 9).to_string(), "step 9 not found");
    }
}
