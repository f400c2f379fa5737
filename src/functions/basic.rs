//! Object identity, version and error reporting.

use crate::Result;
use crate::gateway::{CallGateway, Dispatch};

/// Object identity, version and error state.
pub struct BasicFunctions<'a, D> {
    gateway: &'a CallGateway<D>,
}

impl<'a, D: Dispatch> BasicFunctions<'a, D> {
    pub fn new(gateway: &'a CallGateway<D>) -> Self {
        Self { gateway }
    }

    /// Id of this object instance.
    pub fn id(&self) -> Result<i64> {
        Ok(self.gateway.call_for_int("GetID", &mut crate::args![])?)
    }

    /// Error code of the most recent failed call on this object.
    pub fn last_error(&self) -> Result<i64> {
        Ok(self.gateway.last_error()?)
    }

    /// Version string of the automation module.
    pub fn version(&self) -> Result<String> {
        Ok(self.gateway.call_for_string("Ver", &mut crate::args![])?)
    }

    /// Whether the object pops up message boxes on errors.
    pub fn set_show_error_msg(&self, show: bool) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("SetShowErrorMsg", &mut crate::args![show])?)
    }

    /// Drop the object's internal reference. Called during teardown.
    pub fn release_ref(&self) -> Result<()> {
        Ok(self.gateway.call_expect_1("ReleaseRef", &mut crate::args![])?)
    }
}
