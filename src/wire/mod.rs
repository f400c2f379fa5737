//! Wire-level values for the automation call protocol.
//!
//! Every remote procedure takes a flat array of tagged-union values and
//! returns a single one. This module defines that value type and the rules
//! for flattening native Rust arguments into it.
//!
//! # Module Organization
//!
//! - `error`: Coercion and indexing errors
//! - `value`: The [`WireValue`] tagged union
//! - `geometry`: [`Point`], [`Size`] and [`Rect`]
//! - `args`: [`FunctionArgs`] and the [`WireArg`] expansion rules

mod args;
mod error;
mod geometry;
mod value;

pub use args::{FunctionArgs, WireArg, WireCode};
pub use error::WireError;
pub use geometry::{Point, Rect, Size};
pub use value::WireValue;
