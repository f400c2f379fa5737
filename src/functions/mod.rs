//! Typed call-sites, grouped the way the automation object documents them.
//!
//! Each group borrows the [`CallGateway`](crate::gateway::CallGateway) of a
//! live handle and maps one procedure to one method. Obtain groups through
//! [`DmSoft`](crate::lifecycle::DmSoft):
//!
//! ```ignore
//! let pos = dm.input().cursor_pos()?;
//! dm.input().move_to(Point::new(pos.x + 10, pos.y))?;
//! ```

mod ai;
mod basic;
mod file;
mod input;
mod text;

pub use ai::AiFunctions;
pub use basic::BasicFunctions;
pub use file::FileFunctions;
pub use input::{InputFunctions, KeypadMode, MouseMode, SimMode};
pub use text::TextFunctions;
