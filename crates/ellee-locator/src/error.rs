//! Errors raised while reading effect definitions.

use thiserror::Error;

/// A malformed effect definition.
///
/// These are configuration errors: the effect is reported and skipped, its
/// siblings are still built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("effect \"{effect}\" is missing required field `{field}`")]
    MissingField { effect: String, field: &'static str },

    #[error("Unknown interval {0}")]
    UnknownInterval(String),

    #[error("`{field}` must be a positive integer, got {value:?}")]
    InvalidInteger { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, LocateError>;
