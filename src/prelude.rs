//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use dmsoft::prelude::*;
//!
//! let dm = DmSoft::new(dispatch)?;
//! dm.input().move_to(Point::new(100, 200))?;
//! dm.input().left_click()?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Wire values and arguments
pub use crate::wire::{FunctionArgs, Point, Rect, Size, WireArg, WireCode, WireValue};
pub use crate::{args, wire_enum};

// Calls and decoding
pub use crate::decode::{parse_find_result, parse_int_list, parse_point, parse_string_list};
pub use crate::gateway::{CallError, CallGateway, Dispatch, DispatchError};
pub use crate::memory::MemoryBlock;
pub use crate::model::{FindItem, FindResult, ProcessInfo};

// Handles
pub use crate::config::{Apartment, StageConfig};
pub use crate::functions::{KeypadMode, MouseMode, SimMode};
pub use crate::lifecycle::{DmSoft, ObjectFactory, ProcessStage, ThreadLocalDm};
#[cfg(windows)]
pub use crate::lifecycle::{ComDispatch, ComFactory};
