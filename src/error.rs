//! Error type returned at the construction boundary.
//!
//! Mirrors the posture of this corpus's other catalog/point-cloud crates:
//! a plain enum with a hand-written `Display`/`Error` impl rather than a
//! derive-macro error crate, since nothing here needs error chaining beyond
//! a human-readable message.

use std::fmt;

/// Everything that can go wrong while building a [`crate::Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// `n < 0`, or a column required by the chosen `Kind` was not supplied.
    InvalidDimensions {
        /// What was wrong with the dimensions.
        message: String,
    },
    /// A scalar parameter (`minsep`, `maxsep`, `b`, split method) was out of
    /// its valid range.
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// Allocation failed while building the tree. All transiently allocated
    /// `Cell`s and summaries from the failed build are dropped before this
    /// is returned.
    OutOfMemory,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidDimensions { message } => {
                write!(f, "invalid dimensions: {message}")
            }
            FieldError::InvalidParameter { parameter, message } => {
                write!(f, "invalid parameter `{parameter}`: {message}")
            }
            FieldError::OutOfMemory => write!(f, "allocation failed while building the field"),
        }
    }
}

impl std::error::Error for FieldError {}

/// Shorthand used throughout the crate's fallible entry points.
pub type FieldResult<T> = Result<T, FieldError>;
