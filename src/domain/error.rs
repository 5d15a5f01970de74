//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors come only from reading records out of text.
/// Tree operations themselves are total and never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid grade: {token:?} is not a number")]
    InvalidGrade { token: String },

    #[error("incomplete record for {surname:?}: expected {expected} grades, found {found}")]
    IncompleteRecord {
        surname: String,
        expected: usize,
        found: usize,
    },
}
