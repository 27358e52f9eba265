//! `#[repr(C)]` types and marshaling helpers for the FFI boundary.
//!
//! # Design
//! Nullable inputs become `Option` here, before anything reaches the store,
//! and store results are turned back into C strings and tagged optionals.
//! No sentinel values: an absent timestamp is `present = false`, never a
//! magic number.

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::rc::Rc;

use toodle_core::{StoreError, Timestamp, Toodle};

/// Error codes reported by fallible entry points and by
/// `toodle_last_error_code`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// A required pointer argument was null.
    NullArg = 1,
    /// A string argument was not valid UTF-8.
    InvalidUtf8 = 2,
    /// A uuid argument could not be parsed.
    InvalidUuid = 3,
    /// A handle argument was destroyed or never issued.
    InvalidHandle = 4,
    EmptyName = 5,
    NameTooLong = 6,
    EmptyColor = 7,
    ColorTooLong = 8,
    ItemNotFound = 9,
    LabelNotFound = 10,
    UnknownLabel = 11,
    /// The item or label has no stored identity yet.
    NotPersisted = 12,
    Config = 13,
    /// An internal panic was caught at the boundary.
    Panic = 14,
}

/// An optional timestamp returned by value.
///
/// `value` is seconds since the Unix epoch (UTC) and is only meaningful
/// when `present` is true.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FfiOptionalTimestamp {
    pub present: bool,
    pub value: i64,
}

impl From<Option<Timestamp>> for FfiOptionalTimestamp {
    fn from(ts: Option<Timestamp>) -> Self {
        match ts {
            Some(ts) => FfiOptionalTimestamp {
                present: true,
                value: ts.seconds(),
            },
            None => FfiOptionalTimestamp {
                present: false,
                value: 0,
            },
        }
    }
}

/// A failed call, as recorded on the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FfiError {
    pub(crate) code: FfiErrorCode,
    pub(crate) message: String,
}

impl FfiError {
    pub(crate) fn new(code: FfiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn null_arg(name: &str) -> Self {
        Self::new(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn invalid_handle(name: &str) -> Self {
        Self::new(FfiErrorCode::InvalidHandle, format!("invalid or destroyed handle: {name}"))
    }

    pub(crate) fn panic(function: &str) -> Self {
        Self::new(FfiErrorCode::Panic, format!("panic in {function}"))
    }
}

impl From<StoreError> for FfiError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::EmptyName => FfiErrorCode::EmptyName,
            StoreError::NameTooLong { .. } => FfiErrorCode::NameTooLong,
            StoreError::EmptyColor => FfiErrorCode::EmptyColor,
            StoreError::ColorTooLong { .. } => FfiErrorCode::ColorTooLong,
            StoreError::ItemNotFound(_) => FfiErrorCode::ItemNotFound,
            StoreError::LabelNotFound(_) => FfiErrorCode::LabelNotFound,
            StoreError::UnknownLabel(_) => FfiErrorCode::UnknownLabel,
            StoreError::NotPersisted => FfiErrorCode::NotPersisted,
            StoreError::Config(_) => FfiErrorCode::Config,
        };
        Self::new(code, err.to_string())
    }
}

/// What an `FfiToodle` handle points at.
pub(crate) struct Manager {
    pub(crate) store: Toodle,
    pub(crate) last_error: Option<FfiError>,
    pub(crate) on_items_changed: Option<extern "C" fn()>,
    /// Set by the store's change hook; drained after each call returns.
    pending_change: Rc<Cell<bool>>,
}

impl Manager {
    pub(crate) fn new(mut store: Toodle) -> Self {
        let pending_change = Rc::new(Cell::new(false));
        let flag = Rc::clone(&pending_change);
        store.set_items_changed(Some(Box::new(move || flag.set(true))));
        Self {
            store,
            last_error: None,
            on_items_changed: None,
            pending_change,
        }
    }

    /// Record the outcome of a fallible call and hand back its value.
    pub(crate) fn record<T>(&mut self, result: Result<T, FfiError>) -> Result<T, FfiErrorCode> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(code = ?err.code, message = %err.message, "call rejected");
                let code = err.code;
                self.last_error = Some(err);
                Err(code)
            }
        }
    }

    /// The callback to run once the current call has released the manager,
    /// if any item changed during it.
    pub(crate) fn take_change_notification(&mut self) -> Option<extern "C" fn()> {
        if self.pending_change.replace(false) {
            self.on_items_changed
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// String and scalar marshaling
// ---------------------------------------------------------------------------

/// Borrow a required C string argument.
///
/// # Safety
/// `ptr` must be null or point at a NUL-terminated string that outlives the call.
pub(crate) unsafe fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, FfiError> {
    if ptr.is_null() {
        return Err(FfiError::null_arg(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiError::new(FfiErrorCode::InvalidUtf8, format!("{name} is not valid UTF-8")))
}

/// Borrow an optional C string argument; null means absent.
///
/// # Safety
/// Same as `required_str`.
pub(crate) unsafe fn optional_str<'a>(ptr: *const c_char, name: &str) -> Result<Option<&'a str>, FfiError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { required_str(ptr, name) }.map(Some)
}

/// Read an optional timestamp argument; null means absent.
///
/// # Safety
/// `ptr` must be null or point at a readable `i64`.
pub(crate) unsafe fn optional_timestamp(ptr: *const i64) -> Option<Timestamp> {
    if ptr.is_null() {
        None
    } else {
        Some(Timestamp(unsafe { *ptr }))
    }
}

pub(crate) fn parse_uuid(s: &str) -> Result<uuid::Uuid, FfiError> {
    uuid::Uuid::parse_str(s)
        .map_err(|e| FfiError::new(FfiErrorCode::InvalidUuid, format!("invalid uuid {s:?}: {e}")))
}

/// Hand an owned string to C. Free with `toodle_destroy_string`.
///
/// Strings reaching here came in through `CStr`, so they hold no NUL bytes.
pub(crate) fn string_to_c_char(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}
