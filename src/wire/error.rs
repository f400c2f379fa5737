//! Error types for wire value coercion and argument extraction.

use thiserror::Error;

/// Errors that can occur while coercing or reading wire values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WireError {
    #[error("Cannot coerce {value} to {target}")]
    Coercion { value: String, target: &'static str },

    #[error("Value {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    #[error("Cannot index into an empty argument list (index {0})")]
    EmptyArguments(isize),
}
