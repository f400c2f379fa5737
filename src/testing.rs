//! In-crate test doubles for the automation binding.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gateway::{Dispatch, DispatchError};
use crate::wire::WireValue;

/// A recorded invocation. `args` is `None` for the zero-argument path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub procedure: String,
    pub args: Option<Vec<WireValue>>,
}

impl Call {
    pub fn no_args(procedure: &str) -> Self {
        Self {
            procedure: procedure.to_string(),
            args: None,
        }
    }

    pub fn with_args(procedure: &str, args: Vec<WireValue>) -> Self {
        Self {
            procedure: procedure.to_string(),
            args: Some(args),
        }
    }
}

type Handler = dyn Fn(&str, Option<&mut [WireValue]>) -> Result<WireValue, DispatchError>;

/// Dispatch binding driven by a closure, recording every call.
pub(crate) struct MockDispatch {
    handler: Box<Handler>,
    calls: Rc<RefCell<Vec<Call>>>,
    released: Rc<RefCell<usize>>,
}

impl MockDispatch {
    pub fn new(
        handler: impl Fn(&str, Option<&mut [WireValue]>) -> Result<WireValue, DispatchError> + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Rc::default(),
            released: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Shared view of the call log that outlives the mock.
    pub fn call_log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    pub fn release_count(&self) -> Rc<RefCell<usize>> {
        Rc::clone(&self.released)
    }
}

impl Dispatch for MockDispatch {
    fn invoke(&self, procedure: &str, args: &mut [WireValue]) -> Result<WireValue, DispatchError> {
        self.calls
            .borrow_mut()
            .push(Call::with_args(procedure, args.to_vec()));
        (self.handler)(procedure, Some(args))
    }

    fn invoke_no_args(&self, procedure: &str) -> Result<WireValue, DispatchError> {
        self.calls.borrow_mut().push(Call::no_args(procedure));
        (self.handler)(procedure, None)
    }

    fn release(&mut self) {
        *self.released.borrow_mut() += 1;
    }
}
