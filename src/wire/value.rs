//! The tagged-union value exchanged with the automation object.

use std::fmt;

use super::WireError;

/// A single argument or return value in the automation call protocol.
///
/// Booleans are not a distinct kind on the wire: they travel as `Int(1)` or
/// `Int(0)`. Reading a value as another kind goes through the explicit
/// `as_*` coercions, which never change the stored tag.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Integer value (the automation object uses 32-bit and 64-bit ints).
    Int(i64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// String value.
    Str(String),
    /// Raw native address (window handles, memory pointers).
    Handle(usize),
}

impl WireValue {
    /// Placeholder for an output-parameter slot. The value itself is ignored
    /// by the automation object, which overwrites the slot.
    pub const fn placeholder() -> Self {
        WireValue::Int(0)
    }

    /// Wrap a raw native address.
    pub const fn handle(address: usize) -> Self {
        WireValue::Handle(address)
    }

    /// Short name of the active tag.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Int(_) => "int",
            WireValue::Float(_) => "float",
            WireValue::Double(_) => "double",
            WireValue::Str(_) => "string",
            WireValue::Handle(_) => "handle",
        }
    }

    /// Coerce to an integer. Floating point values are truncated and
    /// numeric strings are parsed.
    pub fn as_int(&self) -> Result<i64, WireError> {
        match self {
            WireValue::Int(v) => Ok(*v),
            WireValue::Float(v) => Ok(*v as i64),
            WireValue::Double(v) => Ok(*v as i64),
            WireValue::Str(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
                    .map_err(|_| self.coercion_error("int"))
            }
            WireValue::Handle(addr) => {
                i64::try_from(*addr).map_err(|_| self.coercion_error("int"))
            }
        }
    }

    /// Coerce to a 32-bit integer, failing when the value does not fit.
    pub fn as_i32(&self) -> Result<i32, WireError> {
        let value = self.as_int()?;
        i32::try_from(value).map_err(|_| WireError::OutOfRange {
            value,
            target: "i32",
        })
    }

    /// Coerce to a boolean: only integer 1 is `true`.
    pub fn as_bool(&self) -> Result<bool, WireError> {
        Ok(self.as_int()? == 1)
    }

    /// Coerce to a double.
    pub fn as_double(&self) -> Result<f64, WireError> {
        match self {
            WireValue::Int(v) => Ok(*v as f64),
            WireValue::Float(v) => Ok(f64::from(*v)),
            WireValue::Double(v) => Ok(*v),
            WireValue::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.coercion_error("double")),
            WireValue::Handle(addr) => Ok(*addr as f64),
        }
    }

    /// Coerce to a single precision float. May lose precision.
    pub fn as_float(&self) -> Result<f32, WireError> {
        match self {
            WireValue::Float(v) => Ok(*v),
            other => Ok(other.as_double()? as f32),
        }
    }

    /// Render the value as a string. Always succeeds.
    pub fn as_string(&self) -> String {
        match self {
            WireValue::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn coercion_error(&self, target: &'static str) -> WireError {
        WireError::Coercion {
            value: format!("{:?}", self),
            target,
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Int(v) => write!(f, "{}", v),
            WireValue::Float(v) => write!(f, "{}", v),
            WireValue::Double(v) => write!(f, "{}", v),
            WireValue::Str(s) => f.write_str(s),
            WireValue::Handle(addr) => write!(f, "{:#x}", addr),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for WireValue {
                fn from(v: $ty) -> Self {
                    WireValue::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for WireValue {
    fn from(v: bool) -> Self {
        WireValue::Int(if v { 1 } else { 0 })
    }
}

impl From<f32> for WireValue {
    fn from(v: f32) -> Self {
        WireValue::Float(v)
    }
}

impl From<f64> for WireValue {
    fn from(v: f64) -> Self {
        WireValue::Double(v)
    }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        WireValue::Str(v.to_string())
    }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self {
        WireValue::Str(v)
    }
}

impl From<&String> for WireValue {
    fn from(v: &String) -> Self {
        WireValue::Str(v.clone())
    }
}
