//! Process staging and per-thread handle ownership.
//!
//! Three layers, each built on the one before:
//!
//! - [`ProcessStage`] copies the bundled native modules out once per process
//!   and registers the automation module.
//! - [`DmSoft`] wraps one live automation object, thread-bound, released on
//!   drop.
//! - [`ThreadLocalDm`] hands each thread its own lazily created [`DmSoft`].
//!
//! On Windows, `ComFactory` creates the object through OLE automation.

#[cfg(windows)]
mod com;
mod stage;
mod thread_local;
mod wrapper;

#[cfg(windows)]
pub use com::{ComDispatch, ComFactory};
pub use stage::{DllRegistrar, ProcessStage, Registrar, StagedModules};
pub use thread_local::{ObjectFactory, ThreadLocalDm};
pub use wrapper::DmSoft;
