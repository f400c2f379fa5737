//! Error types for remote procedure calls.

use thiserror::Error;

use crate::wire::WireError;

/// Failure reported by a [`Dispatch`](super::Dispatch) binding while
/// delivering a call (the call never produced a result).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DispatchError(pub String);

impl DispatchError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors that can occur while calling a remote procedure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    /// The result did not match the expectation and the object reported a
    /// non-zero last error code.
    #[error("Remote procedure '{procedure}' failed with error code {error_code}")]
    RemoteCallFailed { procedure: String, error_code: i64 },

    /// The result did not match the expectation and the object reported no
    /// error code.
    #[error("Remote procedure '{procedure}' returned unexpected result '{actual}' without an error code")]
    UnexpectedResult { procedure: String, actual: String },

    #[error("Dispatch of '{procedure}' failed: {source}")]
    Dispatch {
        procedure: String,
        source: DispatchError,
    },

    #[error("Wire value error: {0}")]
    Wire(#[from] WireError),
}

impl CallError {
    /// Name of the remote procedure involved, if known.
    pub fn procedure(&self) -> Option<&str> {
        match self {
            Self::RemoteCallFailed { procedure, .. }
            | Self::UnexpectedResult { procedure, .. }
            | Self::Dispatch { procedure, .. } => Some(procedure),
            Self::Wire(_) => None,
        }
    }

    /// The remote error code, for [`CallError::RemoteCallFailed`].
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::RemoteCallFailed { error_code, .. } => Some(*error_code),
            _ => None,
        }
    }
}
