//! Reading entries out of search result strings.

use crate::Result;
use crate::gateway::{CallGateway, Dispatch};
use crate::wire::{Point, WireValue};

/// Helpers over the result strings returned by text and image search.
pub struct TextFunctions<'a, D> {
    gateway: &'a CallGateway<D>,
}

impl<'a, D: Dispatch> TextFunctions<'a, D> {
    pub fn new(gateway: &'a CallGateway<D>) -> Self {
        Self { gateway }
    }

    /// Number of matches in a search result string.
    pub fn result_count(&self, result: &str) -> Result<i32> {
        Ok(self
            .gateway
            .call_for_i32("GetResultCount", &mut crate::args![result])?)
    }

    /// Position of match `index` in a search result string.
    pub fn result_pos(&self, result: &str, index: i32) -> Result<Point> {
        let mut args = crate::args![
            result,
            index,
            WireValue::placeholder(),
            WireValue::placeholder()
        ];
        self.gateway.call_expect_1("GetResultPos", &mut args)?;
        Ok(args.get_point(-2, -1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::answering;
    use crate::gateway::{CallError, CallGateway};
    use crate::testing::MockDispatch;
    use crate::Error;

    #[test]
    fn test_result_count() {
        let gw = answering("GetResultCount", WireValue::Int(3));
        assert_eq!(TextFunctions::new(&gw).result_count("0,1,2|1,3,4|2,5,6").unwrap(), 3);
    }

    #[test]
    fn test_result_pos() {
        let gw = CallGateway::new(MockDispatch::new(|_, args| {
            if let Some([_, _, x, y]) = args {
                *x = WireValue::Int(15);
                *y = WireValue::Int(25);
            }
            Ok(WireValue::Int(1))
        }));
        assert_eq!(
            TextFunctions::new(&gw).result_pos("0,15,25", 0).unwrap(),
            Point::new(15, 25)
        );
    }

    #[test]
    fn test_result_pos_out_of_range() {
        // Both the call and GetLastError answer 0.
        let gw = CallGateway::new(MockDispatch::new(|_, _| Ok(WireValue::Int(0))));
        let err = TextFunctions::new(&gw).result_pos("", 4).unwrap_err();
        assert!(matches!(
            err,
            Error::Call(CallError::UnexpectedResult { ref procedure, .. }) if procedure == "GetResultPos"
        ));
    }
}
