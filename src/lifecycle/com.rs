//! OLE automation binding for Windows.
//!
//! [`ComFactory`] enters a COM apartment on the calling thread and creates
//! the object registered under [`StageConfig::prog_id`]. [`ComDispatch`]
//! performs late-bound `IDispatch::Invoke` calls, converting between
//! [`WireValue`] and `VARIANT`. Every argument is passed by reference so the
//! object can write output parameters back into its slot.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr;

use anyhow::Context;
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, CLSIDFromProgID, COINIT_APARTMENTTHREADED, COINIT_MULTITHREADED,
    CoCreateInstance, CoInitializeEx, CoUninitialize, DISPATCH_METHOD, DISPPARAMS, EXCEPINFO,
    IDispatch, VARENUM, VARIANT, VT_BOOL, VT_BSTR, VT_BYREF, VT_EMPTY, VT_I2, VT_I4, VT_I8,
    VT_INT, VT_R4, VT_R8, VT_UI1, VT_UI2, VT_UI4, VT_UINT, VT_VARIANT,
};
use windows::Win32::System::Ole::VariantClear;
use windows::core::{BSTR, GUID, HSTRING, PCWSTR};

use crate::config::{Apartment, StageConfig};
use crate::gateway::{Dispatch, DispatchError};
use crate::lifecycle::ObjectFactory;
use crate::logging::{debug, warn};
use crate::wire::WireValue;

const LOCALE_USER_DEFAULT: u32 = 0x0400;

/// COM initialisation of the current thread, undone on drop.
struct ComApartment {
    _thread_bound: PhantomData<*const ()>,
}

impl ComApartment {
    fn enter(apartment: Apartment) -> anyhow::Result<Self> {
        let model = match apartment {
            Apartment::Mta => COINIT_MULTITHREADED,
            Apartment::Sta => COINIT_APARTMENTTHREADED,
        };
        // SAFETY: balanced by `CoUninitialize` in `Drop`, on this thread.
        unsafe { CoInitializeEx(None, model) }
            .with_context(|| format!("CoInitializeEx({:?}) failed", apartment))?;
        Ok(Self {
            _thread_bound: PhantomData,
        })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        // SAFETY: `enter` succeeded on this thread.
        unsafe { CoUninitialize() }
    }
}

/// Creates [`ComDispatch`] bindings for the configured programmatic id.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComFactory;

impl ObjectFactory for ComFactory {
    type Object = ComDispatch;

    fn create(&self, config: &StageConfig) -> anyhow::Result<ComDispatch> {
        let apartment = ComApartment::enter(config.apartment)?;
        let prog_id = HSTRING::from(config.prog_id.as_str());
        // SAFETY: COM is initialised on this thread for as long as `apartment`
        // lives, and the binding below keeps it alive.
        let object = unsafe {
            let clsid = CLSIDFromProgID(&prog_id)
                .with_context(|| format!("{} is not registered", config.prog_id))?;
            CoCreateInstance::<_, IDispatch>(&clsid, None, CLSCTX_INPROC_SERVER)
                .with_context(|| format!("Failed to create {}", config.prog_id))?
        };
        debug!(prog_id = %config.prog_id, "automation object bound");
        Ok(ComDispatch {
            object: Some(object),
            dispids: RefCell::default(),
            apartment: Some(apartment),
        })
    }
}

/// A late-bound `IDispatch` binding owned by one thread.
pub struct ComDispatch {
    // Dropped before `apartment`.
    object: Option<IDispatch>,
    dispids: RefCell<HashMap<String, i32>>,
    apartment: Option<ComApartment>,
}

impl ComDispatch {
    fn dispid(&self, object: &IDispatch, procedure: &str) -> Result<i32, DispatchError> {
        let cached = self.dispids.borrow().get(procedure).copied();
        if let Some(id) = cached {
            return Ok(id);
        }
        let name = HSTRING::from(procedure);
        let names = [PCWSTR(name.as_ptr())];
        let mut id = 0;
        // SAFETY: `names` holds one valid wide string and `id` one slot.
        unsafe {
            object.GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, LOCALE_USER_DEFAULT, &mut id)
        }
        .map_err(|e| DispatchError::new(format!("Unknown procedure {}: {}", procedure, e)))?;
        self.dispids.borrow_mut().insert(procedure.to_string(), id);
        Ok(id)
    }

    fn call(&self, procedure: &str, args: &mut [WireValue]) -> Result<WireValue, DispatchError> {
        let object = self
            .object
            .as_ref()
            .ok_or_else(|| DispatchError::new("Binding already released"))?;
        let dispid = self.dispid(object, procedure)?;
        let count = u32::try_from(args.len())
            .map_err(|_| DispatchError::new(format!("Too many arguments for {}", procedure)))?;

        let mut values: Vec<VARIANT> = args.iter().map(to_variant).collect();
        // COM takes positional arguments last to first.
        let mut refs: Vec<VARIANT> = values.iter_mut().rev().map(by_ref).collect();
        let params = DISPPARAMS {
            rgvarg: if refs.is_empty() {
                ptr::null_mut()
            } else {
                refs.as_mut_ptr()
            },
            rgdispidNamedArgs: ptr::null_mut(),
            cArgs: count,
            cNamedArgs: 0,
        };
        let mut result = VARIANT::default();
        let mut exception = EXCEPINFO::default();
        let mut arg_error = 0u32;

        // SAFETY: every pointer refers to a local that outlives the call, and
        // the by-reference slots point into `values`.
        let outcome = unsafe {
            object.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                DISPATCH_METHOD,
                &params,
                &mut result,
                &mut exception,
                &mut arg_error,
            )
        };
        let read = outcome
            .map_err(|e| {
                DispatchError::new(format!(
                    "{} failed: {} {}",
                    procedure, e, exception.bstrDescription
                ))
            })
            .and_then(|()| {
                for (slot, value) in args.iter_mut().zip(&values) {
                    *slot = from_variant(value)?;
                }
                from_variant(&result)
            });

        clear(&mut result);
        for value in &mut values {
            clear(value);
        }
        read
    }
}

impl Dispatch for ComDispatch {
    fn invoke(&self, procedure: &str, args: &mut [WireValue]) -> Result<WireValue, DispatchError> {
        self.call(procedure, args)
    }

    fn invoke_no_args(&self, procedure: &str) -> Result<WireValue, DispatchError> {
        self.call(procedure, &mut [])
    }

    fn release(&mut self) {
        self.object.take();
        self.apartment.take();
    }
}

impl std::fmt::Debug for ComDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComDispatch")
            .field("bound", &self.object.is_some())
            .finish_non_exhaustive()
    }
}

fn to_variant(value: &WireValue) -> VARIANT {
    let mut variant = VARIANT::default();
    // SAFETY: each arm writes the tag together with the member it selects.
    unsafe {
        let inner = &mut *variant.Anonymous.Anonymous;
        match value {
            WireValue::Int(v) => match i32::try_from(*v) {
                Ok(v) => {
                    inner.vt = VT_I4;
                    inner.Anonymous.lVal = v;
                }
                Err(_) => {
                    inner.vt = VT_I8;
                    inner.Anonymous.llVal = *v;
                }
            },
            WireValue::Handle(addr) => match i32::try_from(*addr) {
                Ok(v) => {
                    inner.vt = VT_I4;
                    inner.Anonymous.lVal = v;
                }
                Err(_) => {
                    inner.vt = VT_I8;
                    inner.Anonymous.llVal = *addr as i64;
                }
            },
            WireValue::Float(v) => {
                inner.vt = VT_R4;
                inner.Anonymous.fltVal = *v;
            }
            WireValue::Double(v) => {
                inner.vt = VT_R8;
                inner.Anonymous.dblVal = *v;
            }
            WireValue::Str(s) => {
                inner.vt = VT_BSTR;
                inner.Anonymous.bstrVal = ManuallyDrop::new(BSTR::from(s.as_str()));
            }
        }
    }
    variant
}

fn by_ref(target: &mut VARIANT) -> VARIANT {
    let mut variant = VARIANT::default();
    // SAFETY: a by-reference VARIANT only stores the pointer.
    unsafe {
        let inner = &mut *variant.Anonymous.Anonymous;
        inner.vt = VARENUM(VT_BYREF.0 | VT_VARIANT.0);
        inner.Anonymous.pvarVal = target;
    }
    variant
}

fn from_variant(variant: &VARIANT) -> Result<WireValue, DispatchError> {
    // SAFETY: the member read is the one selected by `vt`.
    unsafe {
        let inner = &variant.Anonymous.Anonymous;
        let data = &inner.Anonymous;
        let value = match inner.vt {
            VT_EMPTY => WireValue::Int(0),
            VT_UI1 => WireValue::Int(i64::from(data.bVal)),
            VT_I2 => WireValue::Int(i64::from(data.iVal)),
            VT_UI2 => WireValue::Int(i64::from(data.uiVal)),
            VT_I4 => WireValue::Int(i64::from(data.lVal)),
            VT_INT => WireValue::Int(i64::from(data.intVal)),
            VT_UI4 => WireValue::Int(i64::from(data.ulVal)),
            VT_UINT => WireValue::Int(i64::from(data.uintVal)),
            VT_I8 => WireValue::Int(data.llVal),
            VT_BOOL => WireValue::from(data.boolVal.0 != 0),
            VT_R4 => WireValue::Float(data.fltVal),
            VT_R8 => WireValue::Double(data.dblVal),
            VT_BSTR => WireValue::Str(data.bstrVal.to_string()),
            other => {
                return Err(DispatchError::new(format!(
                    "Unsupported VARIANT type {}",
                    other.0
                )));
            }
        };
        Ok(value)
    }
}

fn clear(variant: &mut VARIANT) {
    // SAFETY: the variant was initialised by this module or by the callee.
    if let Err(e) = unsafe { VariantClear(variant) } {
        warn!(error = %e, "failed to clear VARIANT");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: WireValue) -> WireValue {
        let mut variant = to_variant(&value);
        let back = from_variant(&variant).unwrap();
        clear(&mut variant);
        back
    }

    #[test]
    fn test_scalars_keep_their_kind() {
        assert_eq!(round_trip(WireValue::Int(-7)), WireValue::Int(-7));
        assert_eq!(round_trip(WireValue::Double(0.25)), WireValue::Double(0.25));
        assert_eq!(round_trip(WireValue::from("abc|def")), WireValue::from("abc|def"));
    }

    #[test]
    fn test_wide_int_uses_i8() {
        let variant = to_variant(&WireValue::Int(i64::MAX));
        // SAFETY: reading the tag only.
        let vt = unsafe { variant.Anonymous.Anonymous.vt };
        assert_eq!(vt, VT_I8);
        assert_eq!(from_variant(&variant).unwrap(), WireValue::Int(i64::MAX));
    }

    #[test]
    fn test_by_ref_slot_is_written_back() {
        let mut slot = to_variant(&WireValue::placeholder());
        let reference = by_ref(&mut slot);
        // SAFETY: `reference` points at `slot`, which is still alive.
        unsafe {
            let target = &mut *reference.Anonymous.Anonymous.Anonymous.pvarVal;
            target.Anonymous.Anonymous.Anonymous.lVal = 640;
        }
        assert_eq!(from_variant(&slot).unwrap(), WireValue::Int(640));
    }

    #[test]
    fn test_unregistered_prog_id_fails() {
        let config = StageConfig {
            prog_id: "dmsoft.not.registered".to_string(),
            ..StageConfig::default()
        };
        let err = ComFactory.create(&config).unwrap_err();
        assert!(err.to_string().contains("dmsoft.not.registered"));
    }
}
