//! Opaque handle types with liveness tracking.
//!
//! # Design
//! A handle given to C is not an address. It is a token drawn from one
//! process-wide counter that never repeats, mapped by a per-type registry
//! to the boxed value behind it. Destroy removes the token, so a second
//! destroy, or use after destroy, finds it missing even after the allocator
//! has reused the old memory for a newer handle. Tokens are unique across
//! types too, so passing an item where a label is expected reads as dead.
//! The C side only ever sees an incomplete struct.
//!
//! The registries are the only locked state in the crate. They guard
//! themselves, not the objects behind the handles: callers still serialize
//! calls against one manager.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};

use toodle_core::{Item, Label};

use crate::types::Manager;

/// Token -> address of the boxed value.
type Registry = Mutex<HashMap<usize, usize>>;

static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(1);

fn next_token() -> usize {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Registry entries are plain integers, so a poisoned lock holds nothing
/// half-written.
fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<usize, usize>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Define a registry-tracked opaque handle `$handle` wrapping `$inner`.
macro_rules! opaque_handle {
    (
        $(#[$meta:meta])*
        $handle:ident => $inner:ty, $registry:ident
    ) => {
        static $registry: LazyLock<Registry> = LazyLock::new(|| Mutex::new(HashMap::new()));

        $(#[$meta])*
        #[repr(C)]
        pub struct $handle {
            _private: [u8; 0],
        }

        #[allow(dead_code)]
        impl $handle {
            /// Move `inner` to the heap and hand out a fresh token for it.
            pub(crate) fn into_opaque_ptr(inner: $inner) -> *mut Self {
                let address = Box::into_raw(Box::new(inner)) as usize;
                let token = next_token();
                lock(&$registry).insert(token, address);
                token as *mut Self
            }

            fn address(ptr: *const Self) -> Option<usize> {
                if ptr.is_null() {
                    return None;
                }
                lock(&$registry).get(&(ptr as usize)).copied()
            }

            /// Unregister `ptr` and take its value back.
            ///
            /// `None` for null, never-issued, or already-destroyed handles.
            ///
            /// # Safety
            /// No borrow obtained through `as_ref` / `as_mut` may still be live.
            pub(crate) unsafe fn from_opaque_ptr(ptr: *mut Self) -> Option<$inner> {
                if ptr.is_null() {
                    return None;
                }
                let address = lock(&$registry).remove(&(ptr as usize))?;
                Some(unsafe { *Box::from_raw(address as *mut $inner) })
            }

            pub(crate) fn is_valid(ptr: *const Self) -> bool {
                Self::address(ptr).is_some()
            }

            /// # Safety
            /// The caller must not destroy the handle while the borrow lives.
            pub(crate) unsafe fn as_ref<'a>(ptr: *const Self) -> Option<&'a $inner> {
                let address = Self::address(ptr)?;
                Some(unsafe { &*(address as *const $inner) })
            }

            /// # Safety
            /// No other borrow of the same handle may be live.
            pub(crate) unsafe fn as_mut<'a>(ptr: *mut Self) -> Option<&'a mut $inner> {
                let address = Self::address(ptr)?;
                Some(unsafe { &mut *(address as *mut $inner) })
            }

            /// Destroy a handle. `false` for null, or for a handle that is
            /// not live (double destroy), which is logged and otherwise ignored.
            ///
            /// # Safety
            /// Same as `from_opaque_ptr`.
            pub(crate) unsafe fn release(ptr: *mut Self, function: &str) -> bool {
                if ptr.is_null() {
                    return false;
                }
                match unsafe { Self::from_opaque_ptr(ptr) } {
                    Some(inner) => {
                        drop(inner);
                        true
                    }
                    None => {
                        tracing::warn!(
                            function,
                            handle = stringify!($handle),
                            "ignored destroy of a handle that is not live"
                        );
                        false
                    }
                }
            }

            /// Borrow a handle the C signature declares non-null.
            /// A null or dead handle aborts the process.
            ///
            /// # Safety
            /// Same as `as_ref`.
            pub(crate) unsafe fn expect_ref<'a>(ptr: *const Self, function: &str) -> &'a $inner {
                match unsafe { Self::as_ref(ptr) } {
                    Some(inner) => inner,
                    None => crate::contract_violation(
                        function,
                        concat!(stringify!($handle), " is null or destroyed"),
                    ),
                }
            }

            /// Mutable counterpart of `expect_ref`.
            ///
            /// # Safety
            /// Same as `as_mut`.
            pub(crate) unsafe fn expect_mut<'a>(ptr: *mut Self, function: &str) -> &'a mut $inner {
                match unsafe { Self::as_mut(ptr) } {
                    Some(inner) => inner,
                    None => crate::contract_violation(
                        function,
                        concat!(stringify!($handle), " is null or destroyed"),
                    ),
                }
            }
        }
    };
}

opaque_handle!(
    /// Opaque handle to a Toodle manager.
    ///
    /// Create with `toodle_new` / `toodle_new_with_config`, free with
    /// `toodle_destroy`.
    FfiToodle => Manager, MANAGER_HANDLES
);

opaque_handle!(
    /// Opaque handle to one item's in-memory copy.
    ///
    /// Returned by item creation, lookup, list access and `item_new`.
    /// Free with `item_destroy`.
    FfiItem => Item, ITEM_HANDLES
);

opaque_handle!(
    /// Opaque handle to one label's in-memory copy. Free with `label_destroy`.
    FfiLabel => Label, LABEL_HANDLES
);

opaque_handle!(
    /// Snapshot list of item handles. Free with `item_list_destroy`; the
    /// entries are separate handles and must be freed on their own.
    FfiItemList => Vec<*mut FfiItem>, ITEM_LIST_HANDLES
);

opaque_handle!(
    /// Growable list of label handles. Free with `label_list_destroy`; the
    /// entries are separate handles and must be freed on their own.
    FfiLabelList => Vec<*mut FfiLabel>, LABEL_LIST_HANDLES
);
