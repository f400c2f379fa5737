//! Flattening of heterogeneous argument lists into wire values.

use super::geometry::{Point, Rect, Size};
use super::{WireError, WireValue};
use crate::memory::MemoryBlock;

/// A value that can be lowered into one or more wire values.
///
/// Compound types expand into a fixed number of values in a fixed order:
///
/// | input         | wire values                         |
/// |---------------|-------------------------------------|
/// | [`Point`]     | `x, y`                              |
/// | [`Rect`]      | `x1, y1, x2, y2`                    |
/// | [`Size`]      | `width, height`                     |
/// | [`MemoryBlock`] | `address, length`                 |
/// | enum ([`WireCode`]) | `code`                        |
/// | `bool`        | `1` or `0`                          |
/// | [`WireValue`] | passed through unchanged            |
pub trait WireArg {
    /// Append this value's wire representation to `out`.
    fn lower_into(self, out: &mut Vec<WireValue>);
}

/// An enumerated value with a single integer code on the wire.
///
/// Usually implemented through [`wire_enum!`](crate::wire_enum).
pub trait WireCode {
    fn code(&self) -> i64;
}

impl WireArg for WireValue {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(self);
    }
}

impl WireArg for Point {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self.x));
        out.push(WireValue::from(self.y));
    }
}

impl WireArg for Rect {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.extend([self.x1, self.y1, self.x2, self.y2].map(WireValue::from));
    }
}

impl WireArg for Size {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self.width));
        out.push(WireValue::from(self.height));
    }
}

impl WireArg for MemoryBlock {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::Int(self.address));
        out.push(WireValue::Int(self.length));
    }
}

macro_rules! impl_scalar_arg {
    ($($ty:ty),*) => {
        $(
            impl WireArg for $ty {
                fn lower_into(self, out: &mut Vec<WireValue>) {
                    out.push(WireValue::from(self));
                }
            }
        )*
    };
}

impl_scalar_arg!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String);

impl WireArg for &str {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self));
    }
}

impl WireArg for &String {
    fn lower_into(self, out: &mut Vec<WireValue>) {
        out.push(WireValue::from(self));
    }
}

/// An ordered, flattened argument list for one remote call.
///
/// Procedures with output parameters write their results back into
/// placeholder slots; read them with the `get_*` accessors after the call.
/// Indices may be negative and count from the end (`-1` is the last slot).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionArgs {
    values: Vec<WireValue>,
}

impl FunctionArgs {
    /// Create an empty argument list (selects the zero-argument call path).
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append an argument, expanding compound values.
    pub fn arg(mut self, arg: impl WireArg) -> Self {
        arg.lower_into(&mut self.values);
        self
    }

    /// Append an argument in place.
    pub fn push(&mut self, arg: impl WireArg) -> &mut Self {
        arg.lower_into(&mut self.values);
        self
    }

    pub fn values(&self) -> &[WireValue] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [WireValue] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve a possibly negative index to a slot position.
    ///
    /// Uses remainder-then-correct semantics: `i = index % len`, and if
    /// `i < 0` then `i += len`. Indices outside `-len..len` wrap around.
    pub fn resolve_index(&self, index: isize) -> Result<usize, WireError> {
        let len = self.values.len() as isize;
        if len == 0 {
            return Err(WireError::EmptyArguments(index));
        }
        let mut i = index % len;
        if i < 0 {
            i += len;
        }
        Ok(i as usize)
    }

    /// Read the wire value at `index`.
    pub fn get(&self, index: isize) -> Result<&WireValue, WireError> {
        let i = self.resolve_index(index)?;
        self.values
            .get(i)
            .ok_or(WireError::EmptyArguments(index))
    }

    pub fn get_int(&self, index: isize) -> Result<i64, WireError> {
        self.get(index)?.as_int()
    }

    pub fn get_i32(&self, index: isize) -> Result<i32, WireError> {
        self.get(index)?.as_i32()
    }

    pub fn get_point(&self, x_index: isize, y_index: isize) -> Result<Point, WireError> {
        Ok(Point::new(self.get_i32(x_index)?, self.get_i32(y_index)?))
    }

    pub fn get_size(&self, width_index: isize, height_index: isize) -> Result<Size, WireError> {
        Ok(Size::new(
            self.get_i32(width_index)?,
            self.get_i32(height_index)?,
        ))
    }

    pub fn get_rect(
        &self,
        x1_index: isize,
        y1_index: isize,
        x2_index: isize,
        y2_index: isize,
    ) -> Result<Rect, WireError> {
        Ok(Rect::from_corners(
            self.get_i32(x1_index)?,
            self.get_i32(y1_index)?,
            self.get_i32(x2_index)?,
            self.get_i32(y2_index)?,
        ))
    }

    pub fn get_memory_block(
        &self,
        address_index: isize,
        length_index: isize,
    ) -> Result<MemoryBlock, WireError> {
        Ok(MemoryBlock::new(
            self.get_int(address_index)?,
            self.get_int(length_index)?,
        ))
    }
}

impl From<Vec<WireValue>> for FunctionArgs {
    fn from(values: Vec<WireValue>) -> Self {
        Self { values }
    }
}

impl From<FunctionArgs> for Vec<WireValue> {
    fn from(args: FunctionArgs) -> Self {
        args.values
    }
}

/// Build a [`FunctionArgs`](crate::wire::FunctionArgs) from a heterogeneous
/// list of arguments.
///
/// ```ignore
/// let args = args![Rect::new(0, 0, 100, 100), 0.9f32, true, WireValue::placeholder()];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::wire::FunctionArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::wire::FunctionArgs::new()$(.arg($arg))+
    };
}

/// Declare a fieldless enum whose variants travel as integer codes.
///
/// ```ignore
/// wire_enum! {
///     pub enum SimMode {
///         Normal = 0,
///         Hardware = 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl $crate::wire::WireCode for $name {
            fn code(&self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl $crate::wire::WireArg for $name {
            fn lower_into(self, out: &mut ::std::vec::Vec<$crate::wire::WireValue>) {
                out.push($crate::wire::WireValue::Int(
                    $crate::wire::WireCode::code(&self),
                ));
            }
        }
    };
}
