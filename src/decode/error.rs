//! Error types for result string decoding.

use thiserror::Error;

/// A non-empty result string that violates its documented format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Missing field {index} in '{input}'")]
    MissingField { index: usize, input: String },

    #[error("Invalid integer '{value}'")]
    InvalidInteger { value: String },

    #[error("Coordinates out of range in '{input}'")]
    OutOfRange { input: String },
}
