//! Per-thread ownership of automation objects.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::StageConfig;
use crate::gateway::Dispatch;
use crate::lifecycle::{DmSoft, ProcessStage};
use crate::logging::debug;
use crate::{Error, Result};

/// Creates automation object bindings on the calling thread.
///
/// `create` runs on the thread that will own the binding, after the process
/// stage has completed. Implementations perform whatever per-thread platform
/// setup the binding needs before creating it.
pub trait ObjectFactory: Send + Sync {
    type Object: Dispatch + 'static;

    fn create(&self, config: &StageConfig) -> anyhow::Result<Self::Object>;
}

type Initializer<D> = dyn Fn(&DmSoft<D>) -> anyhow::Result<()> + Send + Sync;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // Owner id -> Rc<DmSoft<_>> created on this thread.
    static HANDLES: RefCell<HashMap<u64, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Hands every thread its own lazily created [`DmSoft`] handle.
///
/// The owner itself is `Send + Sync` and is meant to be shared, typically
/// behind an [`Arc`]. The first [`handle`](ThreadLocalDm::handle) on a thread
/// ensures the process stage, creates the object and runs the optional
/// initializer; later calls on that thread return the same handle.
/// [`close`](ThreadLocalDm::close) tears down the calling thread's handle
/// only. Handles still alive when their thread exits are torn down with it.
pub struct ThreadLocalDm<F: ObjectFactory> {
    owner: u64,
    stage: Arc<ProcessStage>,
    factory: F,
    initializer: Option<Box<Initializer<F::Object>>>,
}

impl<F: ObjectFactory> ThreadLocalDm<F> {
    pub fn new(stage: Arc<ProcessStage>, factory: F) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            stage,
            factory,
            initializer: None,
        }
    }

    /// Run `init` against every newly created handle before it is handed
    /// out. A failing initializer discards the handle.
    pub fn with_initializer(
        mut self,
        init: impl Fn(&DmSoft<F::Object>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.initializer = Some(Box::new(init));
        self
    }

    pub fn stage(&self) -> &ProcessStage {
        &self.stage
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The calling thread's handle, created on first use.
    ///
    /// Creation failures are returned and nothing is cached, so the next
    /// call tries again.
    pub fn handle(&self) -> Result<Rc<DmSoft<F::Object>>> {
        if let Some(existing) = self.cached() {
            return Ok(existing);
        }

        self.stage.ensure()?;
        let object = self
            .factory
            .create(self.stage.config())
            .map_err(Error::HandleCreation)?;
        let dm = Rc::new(DmSoft::new(object)?);
        if let Some(init) = &self.initializer {
            init(&dm).map_err(Error::Init)?;
        }

        let cached: Rc<dyn Any> = dm.clone();
        // Only unavailable while the thread is exiting; the handle is then
        // torn down when the caller drops it.
        let _ = HANDLES.try_with(|handles| handles.borrow_mut().insert(self.owner, cached));
        debug!(owner = self.owner, id = dm.id(), "thread handle created");
        Ok(dm)
    }

    /// Run `f` with the calling thread's handle.
    pub fn with<R>(&self, f: impl FnOnce(&DmSoft<F::Object>) -> R) -> Result<R> {
        let dm = self.handle()?;
        Ok(f(&dm))
    }

    /// Whether the calling thread currently holds a handle.
    pub fn has_handle(&self) -> bool {
        HANDLES
            .try_with(|handles| handles.borrow().contains_key(&self.owner))
            .unwrap_or(false)
    }

    /// Tear down the calling thread's handle. Other threads keep theirs.
    ///
    /// Does nothing if this thread never created one. Teardown is deferred
    /// while a caller still holds the `Rc` returned by
    /// [`handle`](ThreadLocalDm::handle).
    pub fn close(&self) {
        let removed = HANDLES
            .try_with(|handles| handles.borrow_mut().remove(&self.owner))
            .ok()
            .flatten();
        if removed.is_some() {
            debug!(owner = self.owner, "thread handle closed");
        }
    }

    fn cached(&self) -> Option<Rc<DmSoft<F::Object>>> {
        let any = HANDLES
            .try_with(|handles| handles.borrow().get(&self.owner).cloned())
            .ok()
            .flatten()?;
        any.downcast::<DmSoft<F::Object>>().ok()
    }
}

impl<F: ObjectFactory> Drop for ThreadLocalDm<F> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<F: ObjectFactory> std::fmt::Debug for ThreadLocalDm<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadLocalDm")
            .field("owner", &self.owner)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
