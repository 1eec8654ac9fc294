use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to the user by the workout core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("exercise is not selected: {0}")]
    ExerciseNotSelected(String),

    #[error("add at least one set before finishing the workout")]
    EmptySession,

    #[error("workout already completed")]
    SessionCompleted,

    #[error("invalid import file: {0}")]
    InvalidFormat(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
