//! Unified error type for the dmsoft library.
//!
//! Module-specific errors convert into [`Error`] with `?`, so domain
//! call-sites and applications can use a single [`Result`] type.
//!
//! ```ignore
//! use dmsoft::Result;
//!
//! fn click_at(dm: &DmSoft<impl Dispatch>, point: Point) -> Result<()> {
//!     dm.input().move_to(point)?;
//!     dm.input().left_click()
//! }
//! ```

use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::gateway::CallError;
use crate::memory::MemoryError;
use crate::wire::WireError;

/// Unified error type for all dmsoft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A remote call failed or returned an unexpected result.
    #[error(transparent)]
    Call(#[from] CallError),

    /// A composite result string violated its documented format.
    #[error("Failed to decode result: {0}")]
    Decode(#[from] DecodeError),

    /// Staging a buffer into native memory failed.
    #[error("Native memory error: {0}")]
    Memory(#[from] MemoryError),

    /// A wire value could not be read as the requested type.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The one-time native module stage failed. Unrecoverable for the
    /// process.
    #[error("Native stage initialization failed: {0}")]
    StageInitFailed(String),

    /// Invalid stage configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The platform could not create the automation object.
    #[error("Failed to create automation object: {0}")]
    HandleCreation(#[source] anyhow::Error),

    /// A caller-supplied handle initializer failed.
    #[error("Handle initializer failed: {0}")]
    Init(#[source] anyhow::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a remote call error.
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Returns `true` if the one-time stage failed.
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, Self::StageInitFailed(_))
    }

    /// The remote error code, when the object reported one.
    pub fn remote_error_code(&self) -> Option<i64> {
        match self {
            Self::Call(e) => e.error_code(),
            _ => None,
        }
    }
}
