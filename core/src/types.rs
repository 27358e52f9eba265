//! Domain types for the to-do store.
//!
//! # Design
//! `Item` and `Label` are plain owned snapshots. The store hands out clones,
//! so a caller holding one never observes later mutations; it has to fetch
//! again or push its own copy back through `Toodle::save_item`.
//!
//! Timestamps are whole seconds since the Unix epoch, UTC, for every date
//! field in the crate and at the C boundary.

use serde::Deserialize;
use uuid::Uuid;

/// Seconds since the Unix epoch (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn seconds(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp(secs)
    }
}

/// Store-internal label identity. Never exposed across the C boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub(crate) u64);

/// Store-internal item identity; ordering follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub(crate) u64);

/// A named, colored tag.
///
/// `id` is `None` for a label the store never accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub id: Option<LabelId>,
    pub name: String,
    pub color: String,
}

impl Label {
    /// A label that has not been stored.
    pub fn unpersisted(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// A to-do entry as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Absent until the item has been stored.
    pub uuid: Option<Uuid>,
    pub name: String,
    pub due_date: Option<Timestamp>,
    pub completion_date: Option<Timestamp>,
    /// Sorted by label name.
    pub labels: Vec<Label>,
}

impl Item {
    /// An empty item with no identity yet.
    pub fn draft() -> Self {
        Self {
            uuid: None,
            name: String::new(),
            due_date: None,
            completion_date: None,
            labels: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }
}

/// Input for creating an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub completion_date: Option<Timestamp>,
    #[serde(skip)]
    pub labels: Vec<Label>,
}

/// Partial update of a stored item. Fields left as `None` are not touched;
/// `labels: Some(..)` replaces the whole association set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub completion_date: Option<Timestamp>,
    #[serde(skip)]
    pub labels: Option<Vec<Label>>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.due_date.is_none()
            && self.completion_date.is_none()
            && self.labels.is_none()
    }
}
