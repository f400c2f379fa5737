//! Typed access to the `dm.dmsoft` desktop automation object.
//!
//! The automation object is a late-bound component: every procedure takes a
//! flat array of tagged-union values and returns one. This library turns
//! that untyped surface into typed Rust calls.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use dmsoft::prelude::*;
//!
//! // One stage per process, shared by every thread.
//! let stage = Arc::new(ProcessStage::new(StageConfig::from_file("dmsoft.toml")?));
//! let dm = ThreadLocalDm::new(stage, ComFactory);
//!
//! // Each thread gets its own handle on first use.
//! let pos = dm.with(|dm| dm.input().cursor_pos())??;
//! let found = dm.with(|dm| dm.ai().detect_objects(Rect::new(0, 0, 800, 600), 0.5, 0.45))??;
//! ```
//!
//! # Modules
//!
//! - [`wire`] - Wire values and argument flattening
//! - [`memory`] - Staging byte buffers into native memory
//! - [`gateway`] - Named calls, typed results and failure diagnosis
//! - [`decode`] - Parsers for composite result strings
//! - [`lifecycle`] - Process stage, handle teardown and per-thread ownership
//! - [`functions`] - Typed call-sites grouped by area
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features
//!
//! On Windows, `ComFactory` binds to the registered object. Elsewhere,
//! supply an [`ObjectFactory`] of your own.

pub mod config;
pub mod decode;
pub mod functions;
pub mod gateway;
pub mod lifecycle;
mod logging;
pub mod memory;
pub mod model;
pub mod prelude;
pub mod wire;

mod error;
#[cfg(test)]
mod testing;

// Re-export the unified error type
pub use error::{Error, Result};

pub use config::{Apartment, ConfigError, StageConfig};
pub use gateway::{CallError, CallGateway, Dispatch, DispatchError};
pub use lifecycle::{DmSoft, ObjectFactory, ProcessStage, ThreadLocalDm};
#[cfg(windows)]
pub use lifecycle::{ComDispatch, ComFactory};
pub use memory::{MemoryBlock, MemoryError};
pub use model::{FindItem, FindResult, ProcessInfo};
pub use wire::{FunctionArgs, Point, Rect, Size, WireArg, WireError, WireValue};
