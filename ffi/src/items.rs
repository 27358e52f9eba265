//! Item entry points: store operations, item lists, accessors and setters.
//!
//! An `FfiItem` is the caller's own copy of an item. Accessors read the
//! copy, setters change only the copy, and nothing reaches the store until
//! `toodle_save_item` or `toodle_update_item` is called.

use std::os::raw::c_char;
use std::panic::catch_unwind;

use toodle_core::{Item, ItemUpdate, NewItem};

use crate::handles::{FfiItem, FfiItemList, FfiLabel, FfiLabelList, FfiToodle};
use crate::labels::labels_from_list;
use crate::types::{
    optional_str, optional_timestamp, parse_uuid, required_str, string_to_c_char, FfiError,
    FfiErrorCode, FfiOptionalTimestamp,
};
use crate::{call_with_manager, error_code, guard};

fn item_list(items: Vec<Item>) -> *mut FfiItemList {
    let handles = items.into_iter().map(FfiItem::into_opaque_ptr).collect();
    FfiItemList::into_opaque_ptr(handles)
}

fn live_item<'a>(item: *mut FfiItem) -> Result<&'a mut Item, FfiError> {
    if item.is_null() {
        return Err(FfiError::null_arg("item"));
    }
    unsafe { FfiItem::as_mut(item) }.ok_or_else(|| FfiError::invalid_handle("item"))
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

/// Create and store an item, returning a handle to its stored copy.
///
/// `due_date` may be null. `labels` must be a live label list (possibly
/// empty) whose entries are stored labels. Returns null if an argument is
/// null or invalid, or if the store rejects the item; the reason is then
/// available from `toodle_last_error_code`. Free with `item_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_create_item(
    manager: *mut FfiToodle,
    name: *const c_char,
    due_date: *const i64,
    labels: *const FfiLabelList,
) -> *mut FfiItem {
    let result = call_with_manager(manager, "toodle_create_item", |m| {
        let name = unsafe { required_str(name, "name") }?;
        let labels = labels_from_list(labels, "labels")?;
        let input = NewItem {
            name: name.to_string(),
            due_date: unsafe { optional_timestamp(due_date) },
            completion_date: None,
            labels,
        };
        Ok(m.store.create_item(&input)?)
    });
    match result {
        Ok(item) => FfiItem::into_opaque_ptr(item),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Update a stored item. Every nullable argument left null keeps the
/// current value; `labels`, when given, replaces the item's whole label set.
///
/// On success `item` is refreshed with the stored state. Fails with
/// `NotPersisted` for an item that was never saved.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_update_item(
    manager: *mut FfiToodle,
    item: *mut FfiItem,
    name: *const c_char,
    due_date: *const i64,
    completion_date: *const i64,
    labels: *const FfiLabelList,
) -> FfiErrorCode {
    error_code(call_with_manager(manager, "toodle_update_item", |m| {
        let handle = live_item(item)?;
        let uuid = handle
            .uuid
            .ok_or_else(|| FfiError::new(FfiErrorCode::NotPersisted, "item has not been saved"))?;
        let labels = if labels.is_null() {
            None
        } else {
            Some(labels_from_list(labels, "labels")?)
        };
        let update = ItemUpdate {
            name: unsafe { optional_str(name, "name") }?.map(str::to_string),
            due_date: unsafe { optional_timestamp(due_date) },
            completion_date: unsafe { optional_timestamp(completion_date) },
            labels,
        };
        *handle = m.store.update_item(uuid, &update)?;
        Ok(())
    }))
}

/// Same as `toodle_update_item`, for an item known only by its uuid string.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_update_item_by_uuid(
    manager: *mut FfiToodle,
    uuid: *const c_char,
    name: *const c_char,
    due_date: *const i64,
    completion_date: *const i64,
) -> FfiErrorCode {
    error_code(call_with_manager(manager, "toodle_update_item_by_uuid", |m| {
        let uuid = parse_uuid(unsafe { required_str(uuid, "uuid") }?)?;
        let update = ItemUpdate {
            name: unsafe { optional_str(name, "name") }?.map(str::to_string),
            due_date: unsafe { optional_timestamp(due_date) },
            completion_date: unsafe { optional_timestamp(completion_date) },
            labels: None,
        };
        m.store.update_item(uuid, &update)?;
        Ok(())
    }))
}

/// Persist the full local state of `item`, including cleared dates and its
/// label set. A handle from `item_new` is created in the store and receives
/// its uuid. On success `item` is refreshed with the stored state.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_save_item(manager: *mut FfiToodle, item: *mut FfiItem) -> FfiErrorCode {
    error_code(call_with_manager(manager, "toodle_save_item", |m| {
        let handle = live_item(item)?;
        *handle = m.store.save_item(handle)?;
        Ok(())
    }))
}

/// Remove an item from the store. Handles to it stay valid as copies.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_delete_item(manager: *mut FfiToodle, uuid: *const c_char) -> FfiErrorCode {
    error_code(call_with_manager(manager, "toodle_delete_item", |m| {
        let uuid = parse_uuid(unsafe { required_str(uuid, "uuid") }?)?;
        Ok(m.store.delete_item(uuid)?)
    }))
}

/// Look up one item by uuid. Returns null if `uuid` is null or malformed or
/// no such item exists. Free with `item_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_get_item(manager: *mut FfiToodle, uuid: *const c_char) -> *mut FfiItem {
    let result = call_with_manager(manager, "toodle_get_item", |m| {
        let uuid = parse_uuid(unsafe { required_str(uuid, "uuid") }?)?;
        m.store
            .fetch_item(uuid)
            .ok_or_else(|| toodle_core::StoreError::ItemNotFound(uuid).into())
    });
    match result {
        Ok(item) => FfiItem::into_opaque_ptr(item),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Snapshot of every stored item, in creation order. Never null.
///
/// The list and each entry are separate handles: free entries with
/// `item_destroy` and the list with `item_list_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_get_all_items(manager: *mut FfiToodle) -> *mut FfiItemList {
    guard("toodle_get_all_items", || {
        let m = unsafe { FfiToodle::expect_ref(manager, "toodle_get_all_items") };
        item_list(m.store.fetch_items())
    })
}

/// Snapshot of the items carrying the label named `label_name`. Returns null
/// if `label_name` is null or not UTF-8; an unknown label gives an empty list.
#[unsafe(no_mangle)]
pub extern "C" fn toodle_get_items_with_label(
    manager: *mut FfiToodle,
    label_name: *const c_char,
) -> *mut FfiItemList {
    let result = call_with_manager(manager, "toodle_get_items_with_label", |m| {
        let name = unsafe { required_str(label_name, "label_name") }?;
        Ok(m.store.fetch_items_with_label(name))
    });
    match result {
        Ok(items) => item_list(items),
        Err(_) => std::ptr::null_mut(),
    }
}

// ---------------------------------------------------------------------------
// Item lists
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn item_list_count(list: *const FfiItemList) -> u64 {
    guard("item_list_count", || {
        let list = unsafe { FfiItemList::expect_ref(list, "item_list_count") };
        list.len() as u64
    })
}

/// The entry at `index`, or null if `index` is out of range or that entry
/// has already been destroyed. The returned handle is the entry itself, not
/// a copy: destroy it once, with `item_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn item_list_entry_at(list: *const FfiItemList, index: usize) -> *mut FfiItem {
    guard("item_list_entry_at", || {
        let list = unsafe { FfiItemList::expect_ref(list, "item_list_entry_at") };
        match list.get(index) {
            Some(&entry) if FfiItem::is_valid(entry) => entry,
            _ => std::ptr::null_mut(),
        }
    })
}

/// Free a list container. Its entries are not touched.
#[unsafe(no_mangle)]
pub extern "C" fn item_list_destroy(list: *mut FfiItemList) -> bool {
    catch_unwind(|| unsafe { FfiItemList::release(list, "item_list_destroy") }).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Item handles
// ---------------------------------------------------------------------------

/// A blank local item with no uuid. Set its fields, then persist it with
/// `toodle_save_item`. Free with `item_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn item_new() -> *mut FfiItem {
    guard("item_new", || FfiItem::into_opaque_ptr(Item::draft()))
}

/// Free an item handle. The stored item is not deleted. Returns false for
/// null or an already-destroyed handle.
#[unsafe(no_mangle)]
pub extern "C" fn item_destroy(item: *mut FfiItem) -> bool {
    catch_unwind(|| unsafe { FfiItem::release(item, "item_destroy") }).unwrap_or(false)
}

/// The item's uuid, or null if it has never been saved.
#[unsafe(no_mangle)]
pub extern "C" fn item_get_uuid(item: *const FfiItem) -> *mut c_char {
    guard("item_get_uuid", || {
        let item = unsafe { FfiItem::expect_ref(item, "item_get_uuid") };
        item.uuid
            .map_or(std::ptr::null_mut(), |uuid| string_to_c_char(uuid.hyphenated().to_string()))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn item_get_name(item: *const FfiItem) -> *mut c_char {
    guard("item_get_name", || {
        let item = unsafe { FfiItem::expect_ref(item, "item_get_name") };
        string_to_c_char(item.name.as_str())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn item_get_due_date(item: *const FfiItem) -> FfiOptionalTimestamp {
    guard("item_get_due_date", || {
        unsafe { FfiItem::expect_ref(item, "item_get_due_date") }.due_date.into()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn item_get_completion_date(item: *const FfiItem) -> FfiOptionalTimestamp {
    guard("item_get_completion_date", || {
        unsafe { FfiItem::expect_ref(item, "item_get_completion_date") }
            .completion_date
            .into()
    })
}

/// Fresh handles for the item's labels, sorted by name. The list and each
/// entry must be freed by the caller.
#[unsafe(no_mangle)]
pub extern "C" fn item_get_labels(item: *const FfiItem) -> *mut FfiLabelList {
    guard("item_get_labels", || {
        let item = unsafe { FfiItem::expect_ref(item, "item_get_labels") };
        let handles = item.labels.iter().cloned().map(FfiLabel::into_opaque_ptr).collect();
        FfiLabelList::into_opaque_ptr(handles)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn item_labels_count(item: *const FfiItem) -> u64 {
    guard("item_labels_count", || {
        unsafe { FfiItem::expect_ref(item, "item_labels_count") }.labels.len() as u64
    })
}

/// Change the local name. The store validates it on save.
#[unsafe(no_mangle)]
pub extern "C" fn item_set_name(item: *mut FfiItem, name: *const c_char) -> FfiErrorCode {
    guard("item_set_name", || {
        let item = unsafe { FfiItem::expect_mut(item, "item_set_name") };
        match unsafe { required_str(name, "name") } {
            Ok(name) => {
                item.name = name.to_string();
                FfiErrorCode::Ok
            }
            Err(err) => err.code,
        }
    })
}

/// Change the local due date; null clears it.
#[unsafe(no_mangle)]
pub extern "C" fn item_set_due_date(item: *mut FfiItem, due_date: *const i64) {
    guard("item_set_due_date", || {
        let item = unsafe { FfiItem::expect_mut(item, "item_set_due_date") };
        item.due_date = unsafe { optional_timestamp(due_date) };
    })
}

/// Change the local completion date; null clears it.
#[unsafe(no_mangle)]
pub extern "C" fn item_set_completion_date(item: *mut FfiItem, completion_date: *const i64) {
    guard("item_set_completion_date", || {
        let item = unsafe { FfiItem::expect_mut(item, "item_set_completion_date") };
        item.completion_date = unsafe { optional_timestamp(completion_date) };
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
