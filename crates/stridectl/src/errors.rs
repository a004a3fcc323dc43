//! Exit codes for stridectl
//!
//! Domain errors map onto distinct exit statuses so scripts can tell
//! bad input apart from missing records.

use stride_common::StrideError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (I/O, unreadable files)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for invalid input (bad index, date, or argument)
pub const EXIT_INVALID_INPUT: i32 = 64;

/// Exit code when the addressed step/topic/problem does not exist
pub const EXIT_NOT_FOUND: i32 = 66;

/// Exit code when a progress document has not been initialized
pub const EXIT_NOT_INITIALIZED: i32 = 67;

/// Returned by commands that need an existing progress document
#[derive(Debug, thiserror::Error)]
#[error("Progress not initialized for {user}; run `stridectl init` first")]
pub struct NotInitialized {
    pub user: String,
}

/// Pick the exit code for an error chain
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<NotInitialized>().is_some() {
        return EXIT_NOT_INITIALIZED;
    }
    match err.downcast_ref::<StrideError>().map(StrideError::code) {
        Some(404) => EXIT_NOT_FOUND,
        Some(400) => EXIT_INVALID_INPUT,
        _ => EXIT_GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_exit_codes() {
        let bad_index = anyhow::Error::new(StrideError::InvalidIndex("-1".into()));
        assert_eq!(exit_code_for(&bad_index), EXIT_INVALID_INPUT);

        let missing = anyhow::Error::new(NotInitialized { user: "u1".into() });
        assert_eq!(exit_code_for(&missing), EXIT_NOT_INITIALIZED);

        assert_eq!(exit_code_for(&anyhow!("disk on fire")), EXIT_GENERAL_ERROR);
    }
}
