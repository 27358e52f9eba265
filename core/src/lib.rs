//! In-memory to-do store behind the Toodle C boundary.
//!
//! # Overview
//! `Toodle` owns every item and label. Callers get cloned snapshots back
//! and push changes through explicit create / update / save calls, which
//! keeps the C layer free of any storage concerns.
//!
//! # Design
//! - `Toodle` needs `&mut self` for writes and does no locking of its own.
//! - Labels are unique by name and attach to items many-to-many.
//! - Every rejection is a distinct `StoreError` variant.
//! - Dates are `Timestamp` seconds since the Unix epoch, UTC.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::ToodleConfig;
pub use error::StoreError;
pub use store::Toodle;
pub use types::{Item, ItemUpdate, Label, NewItem, Timestamp};
