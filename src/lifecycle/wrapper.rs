//! A single thread-bound automation object handle.

use std::marker::PhantomData;

use crate::functions::{AiFunctions, BasicFunctions, FileFunctions, InputFunctions, TextFunctions};
use crate::gateway::{CallGateway, Dispatch};
use crate::logging::{info, warn};
use crate::Result;

/// One live automation object and its typed call-sites.
///
/// A handle belongs to the thread that created it and cannot be sent to
/// another thread. Dropping it releases the object's own reference and then
/// the binding; failures during teardown are logged and swallowed.
pub struct DmSoft<D: Dispatch> {
    gateway: CallGateway<D>,
    id: i64,
    _thread_bound: PhantomData<*const ()>,
}

impl<D: Dispatch> DmSoft<D> {
    /// Wrap a freshly created binding and read its object id.
    ///
    /// The binding is released again if the id cannot be read.
    pub fn new(dispatch: D) -> Result<Self> {
        let gateway = CallGateway::new(dispatch);
        let id = BasicFunctions::new(&gateway).id();
        let id = match id {
            Ok(id) => id,
            Err(e) => {
                let mut dispatch = gateway.into_inner();
                dispatch.release();
                return Err(e);
            }
        };
        info!(id, "automation object created");
        Ok(Self {
            gateway,
            id,
            _thread_bound: PhantomData,
        })
    }

    /// Object id reported at creation.
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn gateway(&self) -> &CallGateway<D> {
        &self.gateway
    }

    pub fn ai(&self) -> AiFunctions<'_, D> {
        AiFunctions::new(&self.gateway)
    }

    pub fn basic(&self) -> BasicFunctions<'_, D> {
        BasicFunctions::new(&self.gateway)
    }

    pub fn file(&self) -> FileFunctions<'_, D> {
        FileFunctions::new(&self.gateway)
    }

    pub fn input(&self) -> InputFunctions<'_, D> {
        InputFunctions::new(&self.gateway)
    }

    pub fn text(&self) -> TextFunctions<'_, D> {
        TextFunctions::new(&self.gateway)
    }
}

impl<D: Dispatch> Drop for DmSoft<D> {
    fn drop(&mut self) {
        if let Err(e) = self.basic().release_ref() {
            warn!(id = self.id, error = %e, "failed to release object reference");
        }
        self.gateway.dispatch_mut().release();
        info!(id = self.id, "automation object released");
    }
}

impl<D: Dispatch> std::fmt::Debug for DmSoft<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmSoft").field("id", &self.id).finish_non_exhaustive()
    }
}
