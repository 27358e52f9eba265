//! Error types for the to-do store.
//!
//! # Design
//! Every way the store can reject input gets its own variant so the C
//! boundary can report a distinct code instead of collapsing all failures
//! into a null return.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by `Toodle` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name is {len} characters long, limit is {max}")]
    NameTooLong { max: usize, len: usize },

    #[error("color must not be empty")]
    EmptyColor,

    #[error("color is {len} characters long, limit is {max}")]
    ColorTooLong { max: usize, len: usize },

    /// No stored item has this uuid.
    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    /// The label was stored once but no longer exists.
    #[error("label {0:?} not found")]
    LabelNotFound(String),

    /// A label passed with an item was never accepted by the store.
    #[error("label {0:?} is not known to the store")]
    UnknownLabel(String),

    /// The operation needs an identity the value does not carry yet.
    #[error("value has not been persisted")]
    NotPersisted,

    #[error("invalid configuration: {0}")]
    Config(String),
}
