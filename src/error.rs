//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by the simulation entry points.
#[derive(Debug, Error)]
pub enum SimError {
    /// No processes (or actions) were supplied.
    #[error("no input records supplied")]
    EmptyInput,

    /// Round Robin quantum must be at least one cycle.
    #[error("invalid quantum {0}: must be >= 1")]
    InvalidQuantum(i64),

    /// Semantic validation failed; carries every violation found.
    #[error("input rejected with {} violation(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),

    /// Peek or pop on an empty heap.
    #[error("priority queue is empty")]
    EmptyQueue,

    /// A flat-text file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SimError::InvalidQuantum(0).to_string(),
            "invalid quantum 0: must be >= 1"
        );
        assert_eq!(SimError::EmptyQueue.to_string(), "priority queue is empty");

        let err = SimError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::UnknownProcess, "a"),
            ValidationError::new(ValidationErrorKind::ArrivalViolation, "b"),
        ]);
        assert_eq!(err.to_string(), "input rejected with 2 violation(s)");
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = SimError::io(
            "procs.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("procs.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
