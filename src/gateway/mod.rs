//! Named remote procedure calls with typed results.
//!
//! [`CallGateway`] sits on top of a [`Dispatch`] binding. It picks the
//! zero-argument call path for empty argument lists, coerces the returned
//! [`WireValue`] to the requested type and implements the expect-or-diagnose
//! protocol: when a result does not match what the caller expects, the
//! object's `GetLastError` code decides between
//! [`CallError::RemoteCallFailed`] and [`CallError::UnexpectedResult`].

mod error;

pub use error::{CallError, DispatchError};

use std::fmt::Debug;

use crate::logging::debug;
use crate::wire::{FunctionArgs, WireValue};

/// Procedure queried after an unexpected result.
pub const LAST_ERROR_PROCEDURE: &str = "GetLastError";

/// A live binding to one automation object instance.
///
/// Implementations perform the actual late-bound invocation. `invoke` may
/// write output values back into `args`; callers re-read those slots after
/// the call.
pub trait Dispatch {
    /// Invoke `procedure` with a non-empty argument array.
    fn invoke(&self, procedure: &str, args: &mut [WireValue]) -> Result<WireValue, DispatchError>;

    /// Invoke `procedure` without an argument array. This is a distinct wire
    /// form from invoking with an empty array.
    fn invoke_no_args(&self, procedure: &str) -> Result<WireValue, DispatchError>;

    /// Release the underlying binding. Called once, during teardown.
    fn release(&mut self) {}
}

/// Typed call wrappers over a [`Dispatch`] binding.
pub struct CallGateway<D> {
    dispatch: D,
}

impl<D: Dispatch> CallGateway<D> {
    pub fn new(dispatch: D) -> Self {
        Self { dispatch }
    }

    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }

    pub fn dispatch_mut(&mut self) -> &mut D {
        &mut self.dispatch
    }

    pub fn into_inner(self) -> D {
        self.dispatch
    }

    /// Call `procedure` and return the raw wire result.
    pub fn call(&self, procedure: &str, args: &mut FunctionArgs) -> Result<WireValue, CallError> {
        if args.is_empty() {
            return self.call_no_args(procedure);
        }
        let result = self
            .dispatch
            .invoke(procedure, args.as_mut_slice())
            .map_err(|source| CallError::Dispatch {
                procedure: procedure.to_string(),
                source,
            })?;
        debug!(procedure, args = ?args.values(), result = %result, "remote call completed");
        Ok(result)
    }

    fn call_no_args(&self, procedure: &str) -> Result<WireValue, CallError> {
        let result = self
            .dispatch
            .invoke_no_args(procedure)
            .map_err(|source| CallError::Dispatch {
                procedure: procedure.to_string(),
                source,
            })?;
        debug!(procedure, result = %result, "remote call completed");
        Ok(result)
    }

    pub fn call_for_int(&self, procedure: &str, args: &mut FunctionArgs) -> Result<i64, CallError> {
        Ok(self.call(procedure, args)?.as_int()?)
    }

    pub fn call_for_i32(&self, procedure: &str, args: &mut FunctionArgs) -> Result<i32, CallError> {
        Ok(self.call(procedure, args)?.as_i32()?)
    }

    /// Integer result, `true` only when it equals 1.
    pub fn call_for_bool(&self, procedure: &str, args: &mut FunctionArgs) -> Result<bool, CallError> {
        Ok(self.call_for_int(procedure, args)? == 1)
    }

    pub fn call_for_double(&self, procedure: &str, args: &mut FunctionArgs) -> Result<f64, CallError> {
        Ok(self.call(procedure, args)?.as_double()?)
    }

    pub fn call_for_float(&self, procedure: &str, args: &mut FunctionArgs) -> Result<f32, CallError> {
        Ok(self.call(procedure, args)?.as_float()?)
    }

    pub fn call_for_string(&self, procedure: &str, args: &mut FunctionArgs) -> Result<String, CallError> {
        Ok(self.call(procedure, args)?.as_string())
    }

    /// Call `procedure` and require an integer result of 1.
    pub fn call_expect_1(&self, procedure: &str, args: &mut FunctionArgs) -> Result<(), CallError> {
        self.call_expecting(procedure, args, 1i64, Self::call_for_int)
            .map(|_| ())
    }

    /// Call `procedure` through `typed_call` and require `expected`.
    ///
    /// On mismatch the last error code is queried: non-zero yields
    /// [`CallError::RemoteCallFailed`], zero yields
    /// [`CallError::UnexpectedResult`]. Nothing is retried.
    pub fn call_expecting<T, F>(
        &self,
        procedure: &str,
        args: &mut FunctionArgs,
        expected: T,
        typed_call: F,
    ) -> Result<T, CallError>
    where
        T: PartialEq + Debug,
        F: FnOnce(&Self, &str, &mut FunctionArgs) -> Result<T, CallError>,
    {
        let result = typed_call(self, procedure, args)?;
        if result == expected {
            return Ok(result);
        }

        let error_code = self.last_error()?;
        if error_code != 0 {
            Err(CallError::RemoteCallFailed {
                procedure: procedure.to_string(),
                error_code,
            })
        } else {
            Err(CallError::UnexpectedResult {
                procedure: procedure.to_string(),
                actual: format!("{:?}", result),
            })
        }
    }

    /// Last error code recorded by the automation object.
    pub fn last_error(&self) -> Result<i64, CallError> {
        Ok(self.call_no_args(LAST_ERROR_PROCEDURE)?.as_int()?)
    }
}
