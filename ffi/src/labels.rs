//! Label entry points and label lists.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use toodle_core::{Label, StoreError};

use crate::handles::{FfiLabel, FfiLabelList, FfiToodle};
use crate::types::{required_str, string_to_c_char, FfiError, FfiErrorCode};
use crate::{call_with_manager, error_code, guard};

fn label_list(labels: Vec<Label>) -> *mut FfiLabelList {
    let handles = labels.into_iter().map(FfiLabel::into_opaque_ptr).collect();
    FfiLabelList::into_opaque_ptr(handles)
}

/// Copy the labels behind a label list argument.
///
/// Null is `NullArg`; a dead list, or a list holding a destroyed entry, is
/// `InvalidHandle`.
pub(crate) fn labels_from_list(list: *const FfiLabelList, name: &str) -> Result<Vec<Label>, FfiError> {
    if list.is_null() {
        return Err(FfiError::null_arg(name));
    }
    let entries = unsafe { FfiLabelList::as_ref(list) }.ok_or_else(|| FfiError::invalid_handle(name))?;
    entries
        .iter()
        .map(|&entry| {
            unsafe { FfiLabel::as_ref(entry) }
                .cloned()
                .ok_or_else(|| FfiError::invalid_handle("label list entry"))
        })
        .collect()
}

fn lossy(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

/// Create a label, or recolor the stored label that already has this name.
/// Never null.
///
/// The color is stored verbatim, e.g. `"#FF0000"`. If the store rejects
/// the name or color, or either is not UTF-8, an unpersisted label carrying
/// the given strings is returned and the reason is recorded on the manager.
/// A null or dead manager, or a null string, aborts the process.
/// Free with `label_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_create_label(
    manager: *mut FfiToodle,
    name: *const c_char,
    color: *const c_char,
) -> *mut FfiLabel {
    const FUNCTION: &str = "toodle_create_label";
    if !FfiToodle::is_valid(manager) {
        crate::contract_violation(FUNCTION, "FfiToodle is null or destroyed");
    }
    if name.is_null() || color.is_null() {
        crate::contract_violation(FUNCTION, "name and color must not be null");
    }

    let result = call_with_manager(manager, FUNCTION, |m| {
        let name = unsafe { required_str(name, "name") }?;
        let color = unsafe { required_str(color, "color") }?;
        Ok(m.store.create_label(name, color)?)
    });
    guard(FUNCTION, || match result {
        Ok(label) => FfiLabel::into_opaque_ptr(label),
        Err(_) => FfiLabel::into_opaque_ptr(Label::unpersisted(lossy(name), lossy(color))),
    })
}

/// Snapshot of every stored label, sorted by name. Never null.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_get_all_labels(manager: *mut FfiToodle) -> *mut FfiLabelList {
    guard("toodle_get_all_labels", || {
        let m = unsafe { FfiToodle::expect_ref(manager, "toodle_get_all_labels") };
        label_list(m.store.fetch_labels())
    })
}

/// Look up a label by name, or null if there is none.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_get_label(manager: *mut FfiToodle, name: *const c_char) -> *mut FfiLabel {
    let result = call_with_manager(manager, "toodle_get_label", |m| {
        let name = unsafe { required_str(name, "name") }?;
        m.store
            .fetch_label(name)
            .ok_or_else(|| StoreError::LabelNotFound(name.to_string()).into())
    });
    match result {
        Ok(label) => FfiLabel::into_opaque_ptr(label),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Persist the local color of a stored label and refresh the handle.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_save_label(manager: *mut FfiToodle, label: *mut FfiLabel) -> FfiErrorCode {
    error_code(call_with_manager(manager, "toodle_save_label", |m| {
        if label.is_null() {
            return Err(FfiError::null_arg("label"));
        }
        let handle = unsafe { FfiLabel::as_mut(label) }.ok_or_else(|| FfiError::invalid_handle("label"))?;
        *handle = m.store.update_label(handle)?;
        Ok(())
    }))
}

// ---------------------------------------------------------------------------
// Label lists
// ---------------------------------------------------------------------------

/// An empty label list, for building the label set of a new item.
#[unsafe(no_mangle)]
pub extern "C" fn label_list_new() -> *mut FfiLabelList {
    guard("label_list_new", || FfiLabelList::into_opaque_ptr(Vec::new()))
}

#[unsafe(no_mangle)]
pub extern "C" fn label_list_count(list: *const FfiLabelList) -> u64 {
    guard("label_list_count", || {
        unsafe { FfiLabelList::expect_ref(list, "label_list_count") }.len() as u64
    })
}

/// The entry at `index`: the handle that was added, not a copy.
///
/// An out-of-range index or a destroyed entry aborts the process.
#[unsafe(no_mangle)]
pub extern "C" fn label_list_entry_at(list: *const FfiLabelList, index: usize) -> *mut FfiLabel {
    guard("label_list_entry_at", || {
        let entries = unsafe { FfiLabelList::expect_ref(list, "label_list_entry_at") };
        match entries.get(index) {
            Some(&entry) if FfiLabel::is_valid(entry) => entry,
            Some(_) => crate::contract_violation("label_list_entry_at", "entry has been destroyed"),
            None => crate::contract_violation("label_list_entry_at", "index out of range"),
        }
    })
}

/// Append `label` itself to `list`. The list does not take ownership: the
/// label is still destroyed on its own with `label_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn add_label(list: *mut FfiLabelList, label: *mut FfiLabel) {
    guard("add_label", || {
        if !FfiLabel::is_valid(label) {
            crate::contract_violation("add_label", "FfiLabel is null or destroyed");
        }
        let entries = unsafe { FfiLabelList::expect_mut(list, "add_label") };
        entries.push(label);
    })
}

/// Free a list container. Its entries are not touched.
#[unsafe(no_mangle)]
pub extern "C" fn label_list_destroy(list: *mut FfiLabelList) -> bool {
    catch_unwind(|| unsafe { FfiLabelList::release(list, "label_list_destroy") }).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Label handles
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn label_destroy(label: *mut FfiLabel) -> bool {
    catch_unwind(|| unsafe { FfiLabel::release(label, "label_destroy") }).unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn label_get_name(label: *const FfiLabel) -> *mut c_char {
    guard("label_get_name", || {
        string_to_c_char(unsafe { FfiLabel::expect_ref(label, "label_get_name") }.name.as_str())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn label_get_color(label: *const FfiLabel) -> *mut c_char {
    guard("label_get_color", || {
        string_to_c_char(unsafe { FfiLabel::expect_ref(label, "label_get_color") }.color.as_str())
    })
}

/// Change the local color, kept verbatim. `toodle_save_label` persists it.
#[unsafe(no_mangle)]
pub extern "C" fn label_set_color(label: *mut FfiLabel, color: *const c_char) -> FfiErrorCode {
    guard("label_set_color", || {
        let label = unsafe { FfiLabel::expect_mut(label, "label_set_color") };
        match unsafe { required_str(color, "color") } {
            Ok(color) => {
                label.color = color.to_string();
                FfiErrorCode::Ok
            }
            Err(err) => err.code,
        }
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
