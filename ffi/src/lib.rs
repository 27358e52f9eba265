//! C-ABI boundary around `toodle-core`.
//!
//! # Overview
//! Exposes the Toodle item and label store through `extern "C"` functions
//! for a managed-language host (Swift, Kotlin via JNA, ...). The host holds
//! opaque handles and drives every lifetime: each handle returned here has
//! exactly one matching destroy call.
//!
//! # Design
//! - Every handle is registry-tracked (`handles`), so destroying twice or
//!   using a destroyed handle is detected instead of touching freed memory.
//! - Item and label handles are in-memory copies. Setters change only the
//!   copy; `toodle_save_item` / `toodle_save_label` persist it.
//! - Lists hold handles, not values. A list and its entries are destroyed
//!   separately; destroying a list never destroys its entries.
//! - Fallible calls return `FfiErrorCode` or null and record the failure on
//!   the manager (`toodle_last_error_code` / `toodle_last_error_message`).
//! - A null or dead handle where the signature promises a non-null result is
//!   a contract violation: logged, then the process aborts.
//! - Timestamps are `int64_t` seconds since the Unix epoch, UTC. Optional
//!   timestamps come in as nullable `const int64_t*` and go out as
//!   `FfiOptionalTimestamp`.
//! - No internal synchronization: calls against one manager must be
//!   serialized by the host.
//! - Every returned `char*` is owned by the caller and freed with
//!   `toodle_destroy_string`.
//! - Every call that goes through the manager takes `FfiToodle*`, reads
//!   included, since it may record the last error or fire the change
//!   callback. Only the last-error getters take `const FfiToodle*`.

pub mod handles;
pub mod items;
pub mod labels;
pub mod logging;
pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use toodle_core::{Toodle, ToodleConfig};

pub use handles::{FfiItem, FfiItemList, FfiLabel, FfiLabelList, FfiToodle};
pub use types::{FfiErrorCode, FfiOptionalTimestamp};

use types::{FfiError, Manager};

// ---------------------------------------------------------------------------
// Boundary plumbing
// ---------------------------------------------------------------------------

/// Log a broken calling contract and abort. Unwinding into the host would be
/// undefined behavior, and there is no value to return.
pub(crate) fn contract_violation(function: &str, what: &str) -> ! {
    tracing::error!(function, what, "contract violation at the C boundary");
    std::process::abort()
}

/// Run `f` for an entry point with a non-null result, aborting on panic.
pub(crate) fn guard<T>(function: &str, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| contract_violation(function, "panicked"))
}

/// Run a fallible call against a live manager.
///
/// The outcome is recorded as the manager's last error, and the host's
/// items-changed callback fires after the manager borrow has ended, so the
/// callback may call straight back into this library.
pub(crate) fn call_with_manager<T>(
    manager: *mut FfiToodle,
    function: &str,
    body: impl FnOnce(&mut Manager) -> Result<T, FfiError>,
) -> Result<T, FfiErrorCode> {
    if manager.is_null() {
        tracing::warn!(function, "null manager");
        return Err(FfiErrorCode::NullArg);
    }
    let Some(m) = (unsafe { FfiToodle::as_mut(manager) }) else {
        tracing::warn!(function, "manager handle is not live");
        return Err(FfiErrorCode::InvalidHandle);
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| body(&mut *m)))
        .unwrap_or_else(|_| Err(FfiError::panic(function)));
    let result = m.record(outcome);
    let notify = m.take_change_notification();

    if let Some(callback) = notify {
        callback();
    }
    result
}

/// Collapse a call result into the code returned to C.
pub(crate) fn error_code<T>(result: Result<T, FfiErrorCode>) -> FfiErrorCode {
    match result {
        Ok(_) => FfiErrorCode::Ok,
        Err(code) => code,
    }
}

// ---------------------------------------------------------------------------
// Manager lifecycle
// ---------------------------------------------------------------------------

/// Create a manager with default configuration. Never null.
///
/// Also installs the stderr logger on first use (see `toodle_init_logging`).
/// Free with `toodle_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_new() -> *mut FfiToodle {
    guard("toodle_new", || {
        logging::init(None, None);
        tracing::debug!("creating manager with default config");
        FfiToodle::into_opaque_ptr(Manager::new(Toodle::new()))
    })
}

/// Create a manager from a JSON configuration object, e.g.
/// `{"max_name_length": 256, "log_filter": "toodle_core=debug"}`.
///
/// Returns null if `config_json` is null, not UTF-8, or not a valid config.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_new_with_config(config_json: *const c_char) -> *mut FfiToodle {
    catch_unwind(|| {
        let json = match unsafe { types::required_str(config_json, "config_json") } {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(message = %err.message, "rejected manager config");
                return std::ptr::null_mut();
            }
        };
        let config = match ToodleConfig::from_json(json) {
            Ok(config) => config,
            Err(err) => {
                logging::init(None, None);
                tracing::warn!(error = %err, "rejected manager config");
                return std::ptr::null_mut();
            }
        };
        logging::init(None, config.log_filter.as_deref());
        tracing::debug!(?config, "creating manager");
        FfiToodle::into_opaque_ptr(Manager::new(Toodle::with_config(config)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a manager. Item, label and list handles obtained from it stay valid
/// and must still be destroyed individually.
///
/// Returns false for null or an already-destroyed manager.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_destroy(manager: *mut FfiToodle) -> bool {
    catch_unwind(|| unsafe { FfiToodle::release(manager, "toodle_destroy") }).unwrap_or(false)
}

/// Register the callback run after every item create, update, save or
/// delete. Pass null to unregister. A newly registered callback runs once
/// immediately so the host can load its initial state.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_on_items_changed(manager: *mut FfiToodle, callback: Option<extern "C" fn()>) {
    guard("toodle_on_items_changed", || {
        let m = unsafe { FfiToodle::expect_mut(manager, "toodle_on_items_changed") };
        m.on_items_changed = callback;
    });
    if let Some(callback) = callback {
        callback();
    }
}

/// Install a stderr logger if the host has not installed a `tracing`
/// subscriber. `filter` may be null; then `TOODLE_LOG`, then `"info"`, is
/// used. Only the first call in a process has any effect.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_init_logging(filter: *const c_char) {
    let _ = catch_unwind(|| {
        let filter = unsafe { types::optional_str(filter, "filter") }.ok().flatten();
        logging::init(filter, None);
    });
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Code of the last failed call on `manager`, or `Ok` if the last fallible
/// call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_last_error_code(manager: *const FfiToodle) -> FfiErrorCode {
    if manager.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| match unsafe { FfiToodle::as_ref(manager) } {
        Some(m) => m.last_error.as_ref().map_or(FfiErrorCode::Ok, |e| e.code),
        None => FfiErrorCode::InvalidHandle,
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Message of the last failed call on `manager`, or null if there is none.
/// Free with `toodle_destroy_string`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_last_error_message(manager: *const FfiToodle) -> *mut c_char {
    catch_unwind(|| match unsafe { FfiToodle::as_ref(manager) } {
        Some(m) => m
            .last_error
            .as_ref()
            .map_or(std::ptr::null_mut(), |e| types::string_to_c_char(e.message.as_str())),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_destroy_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

/// Copy a library-owned C string into a `String` and free the original.
#[cfg(test)]
pub(crate) fn take_string(s: *mut c_char) -> String {
    assert!(!s.is_null(), "expected a string");
    let owned = unsafe { std::ffi::CStr::from_ptr(s) }.to_str().unwrap().to_string();
    toodle_destroy_string(s);
    owned
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};

    #[test]
    fn manager_new_and_destroy() {
        let manager = toodle_new();
        assert!(!manager.is_null());
        assert!(toodle_destroy(manager));
    }

    #[test]
    fn manager_double_destroy_is_detected() {
        let manager = toodle_new();
        assert!(toodle_destroy(manager));
        assert!(!toodle_destroy(manager));
    }

    #[test]
    fn manager_destroy_null_is_safe() {
        assert!(!toodle_destroy(std::ptr::null_mut()));
    }

    #[test]
    fn new_with_config_applies_limits() {
        let json = CString::new(r#"{"max_name_length": 3}"#).unwrap();
        let manager = toodle_new_with_config(json.as_ptr());
        assert!(!manager.is_null());

        let m = unsafe { FfiToodle::as_ref(manager) }.unwrap();
        assert_eq!(m.store.config().max_name_length, 3);
        toodle_destroy(manager);
    }

    #[test]
    fn new_with_config_rejects_bad_json() {
        let json = CString::new("{not json").unwrap();
        assert!(toodle_new_with_config(json.as_ptr()).is_null());
    }

    #[test]
    fn new_with_config_rejects_zero_limit() {
        let json = CString::new(r#"{"max_name_length": 0}"#).unwrap();
        assert!(toodle_new_with_config(json.as_ptr()).is_null());
    }

    #[test]
    fn new_with_config_null_returns_null() {
        assert!(toodle_new_with_config(std::ptr::null()).is_null());
    }

    #[test]
    fn fresh_manager_has_no_error() {
        let manager = toodle_new();
        assert_eq!(toodle_last_error_code(manager), FfiErrorCode::Ok);
        assert!(toodle_last_error_message(manager).is_null());
        toodle_destroy(manager);
    }

    #[test]
    fn last_error_on_null_or_dead_manager() {
        assert_eq!(toodle_last_error_code(std::ptr::null()), FfiErrorCode::NullArg);
        let manager = toodle_new();
        toodle_destroy(manager);
        assert_eq!(toodle_last_error_code(manager), FfiErrorCode::InvalidHandle);
        assert!(toodle_last_error_message(manager).is_null());
    }

    #[test]
    fn call_with_manager_rejects_null_and_dead() {
        let null: Result<(), _> = call_with_manager(std::ptr::null_mut(), "test", |_| Ok(()));
        assert_eq!(null, Err(FfiErrorCode::NullArg));

        let manager = toodle_new();
        toodle_destroy(manager);
        let dead: Result<(), _> = call_with_manager(manager, "test", |_| Ok(()));
        assert_eq!(dead, Err(FfiErrorCode::InvalidHandle));
    }

    #[test]
    fn call_with_manager_turns_panic_into_error() {
        let manager = toodle_new();
        let result: Result<(), _> = call_with_manager(manager, "test", |_| panic!("boom"));
        assert_eq!(result, Err(FfiErrorCode::Panic));
        assert_eq!(toodle_last_error_code(manager), FfiErrorCode::Panic);
        assert_eq!(take_string(toodle_last_error_message(manager)), "panic in test");
        toodle_destroy(manager);
    }

    static CHANGES: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn count_change() {
        CHANGES.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn items_changed_callback_fires_on_register_and_mutation() {
        let manager = toodle_new();
        toodle_on_items_changed(manager, Some(count_change));
        assert_eq!(CHANGES.load(Ordering::SeqCst), 1);

        let name = CString::new("watched").unwrap();
        let labels = labels::label_list_new();
        let item = items::toodle_create_item(manager, name.as_ptr(), std::ptr::null(), labels);
        assert!(!item.is_null());
        assert_eq!(CHANGES.load(Ordering::SeqCst), 2);

        // A rejected call changes nothing and does not notify.
        let empty = CString::new("").unwrap();
        assert_eq!(items::item_set_name(item, empty.as_ptr()), FfiErrorCode::Ok);
        assert_eq!(items::toodle_save_item(manager, item), FfiErrorCode::EmptyName);
        assert_eq!(CHANGES.load(Ordering::SeqCst), 2);

        toodle_on_items_changed(manager, None);
        let other = items::toodle_create_item(manager, name.as_ptr(), std::ptr::null(), labels);
        assert_eq!(CHANGES.load(Ordering::SeqCst), 2);

        items::item_destroy(item);
        items::item_destroy(other);
        labels::label_list_destroy(labels);
        toodle_destroy(manager);
    }

    static WATCHED_MANAGER: AtomicPtr<FfiToodle> = AtomicPtr::new(std::ptr::null_mut());
    static ITEMS_SEEN: AtomicU64 = AtomicU64::new(u64::MAX);

    extern "C" fn reload_items() {
        let manager = WATCHED_MANAGER.load(Ordering::SeqCst);
        let list = items::toodle_get_all_items(manager);
        let count = items::item_list_count(list);
        for index in 0..count as usize {
            items::item_destroy(items::item_list_entry_at(list, index));
        }
        items::item_list_destroy(list);
        ITEMS_SEEN.store(count, Ordering::SeqCst);
    }

    #[test]
    fn items_changed_callback_can_call_back_in() {
        let manager = toodle_new();
        WATCHED_MANAGER.store(manager, Ordering::SeqCst);
        toodle_on_items_changed(manager, Some(reload_items));
        assert_eq!(ITEMS_SEEN.load(Ordering::SeqCst), 0);

        let labels = labels::label_list_new();
        let name = CString::new("first").unwrap();
        let first = items::toodle_create_item(manager, name.as_ptr(), std::ptr::null(), labels);
        assert_eq!(ITEMS_SEEN.load(Ordering::SeqCst), 1);

        let name = CString::new("second").unwrap();
        let second = items::toodle_create_item(manager, name.as_ptr(), std::ptr::null(), labels);
        assert_eq!(ITEMS_SEEN.load(Ordering::SeqCst), 2);

        let uuid = CString::new(take_string(items::item_get_uuid(first))).unwrap();
        assert_eq!(items::toodle_delete_item(manager, uuid.as_ptr()), FfiErrorCode::Ok);
        assert_eq!(ITEMS_SEEN.load(Ordering::SeqCst), 1);

        toodle_on_items_changed(manager, None);
        items::item_destroy(first);
        items::item_destroy(second);
        labels::label_list_destroy(labels);
        toodle_destroy(manager);
    }

    #[test]
    fn init_logging_accepts_null() {
        toodle_init_logging(std::ptr::null());
    }

    #[test]
    fn destroy_string_null_is_safe() {
        toodle_destroy_string(std::ptr::null_mut());
    }
}
