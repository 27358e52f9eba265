//! In-memory item and label store.
//!
//! # Design
//! `Toodle` owns every durable record. Callers only ever receive cloned
//! `Item` / `Label` snapshots, so the store is free to reorganise its own
//! tables without invalidating anything a caller holds.
//!
//! Items are keyed by a monotonically increasing `ItemId`, which makes
//! listing order equal to creation order. Labels are unique by name. The
//! item/label association is many-to-many and lives in a separate join set
//! rather than inside either record.
//!
//! There is no internal locking. A `Toodle` is driven through `&mut self`
//! and callers serialize access themselves.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ToodleConfig;
use crate::error::StoreError;
use crate::types::{Item, ItemId, ItemUpdate, Label, LabelId, NewItem, Timestamp};

#[derive(Debug, Clone)]
struct ItemRecord {
    uuid: Uuid,
    name: String,
    due_date: Option<Timestamp>,
    completion_date: Option<Timestamp>,
}

#[derive(Debug, Clone)]
struct LabelRecord {
    name: String,
    color: String,
}

type ChangeCallback = Box<dyn FnMut()>;

/// The to-do manager.
pub struct Toodle {
    config: ToodleConfig,
    next_item_id: u64,
    next_label_id: u64,
    items: BTreeMap<ItemId, ItemRecord>,
    uuids: HashMap<Uuid, ItemId>,
    labels: BTreeMap<LabelId, LabelRecord>,
    label_names: HashMap<String, LabelId>,
    item_labels: BTreeSet<(ItemId, LabelId)>,
    items_changed: Option<ChangeCallback>,
}

impl fmt::Debug for Toodle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toodle")
            .field("config", &self.config)
            .field("items", &self.items.len())
            .field("labels", &self.labels.len())
            .field("item_labels", &self.item_labels.len())
            .field("items_changed", &self.items_changed.is_some())
            .finish()
    }
}

impl Default for Toodle {
    fn default() -> Self {
        Self::new()
    }
}

impl Toodle {
    pub fn new() -> Self {
        Self::with_config(ToodleConfig::default())
    }

    pub fn with_config(config: ToodleConfig) -> Self {
        Self {
            config,
            next_item_id: 1,
            next_label_id: 1,
            items: BTreeMap::new(),
            uuids: HashMap::new(),
            labels: BTreeMap::new(),
            label_names: HashMap::new(),
            item_labels: BTreeSet::new(),
            items_changed: None,
        }
    }

    pub fn config(&self) -> &ToodleConfig {
        &self.config
    }

    /// Register (or clear) the hook run after every successful item mutation.
    pub fn set_items_changed(&mut self, callback: Option<ChangeCallback>) {
        self.items_changed = callback;
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub fn create_item(&mut self, input: &NewItem) -> Result<Item, StoreError> {
        self.validate_name(&input.name)?;
        let label_ids = self.resolve_labels(&input.labels)?;

        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        let uuid = Uuid::new_v4();

        self.items.insert(
            id,
            ItemRecord {
                uuid,
                name: input.name.clone(),
                due_date: input.due_date,
                completion_date: input.completion_date,
            },
        );
        self.uuids.insert(uuid, id);
        for label_id in label_ids {
            self.item_labels.insert((id, label_id));
        }
        debug!(%uuid, name = %input.name, labels = input.labels.len(), "created item");

        self.notify_items_changed();
        Ok(self.snapshot(id))
    }

    pub fn update_item(&mut self, uuid: Uuid, update: &ItemUpdate) -> Result<Item, StoreError> {
        let id = self.item_id(uuid)?;
        if let Some(name) = &update.name {
            self.validate_name(name)?;
        }
        let label_ids = match &update.labels {
            Some(labels) => Some(self.resolve_labels(labels)?),
            None => None,
        };

        if update.is_empty() {
            return Ok(self.snapshot(id));
        }

        let record = self.items.get_mut(&id).ok_or(StoreError::ItemNotFound(uuid))?;
        if let Some(name) = &update.name {
            record.name = name.clone();
        }
        if let Some(due) = update.due_date {
            record.due_date = Some(due);
        }
        if let Some(done) = update.completion_date {
            record.completion_date = Some(done);
        }
        if let Some(label_ids) = label_ids {
            self.replace_labels(id, label_ids);
        }
        debug!(%uuid, "updated item");

        self.notify_items_changed();
        Ok(self.snapshot(id))
    }

    /// Persist every field of `item`, including cleared dates.
    ///
    /// A draft (no uuid) is created and comes back with its new identity.
    pub fn save_item(&mut self, item: &Item) -> Result<Item, StoreError> {
        let Some(uuid) = item.uuid else {
            return self.create_item(&NewItem {
                name: item.name.clone(),
                due_date: item.due_date,
                completion_date: item.completion_date,
                labels: item.labels.clone(),
            });
        };

        let id = self.item_id(uuid)?;
        self.validate_name(&item.name)?;
        let label_ids = self.resolve_labels(&item.labels)?;

        let record = self.items.get_mut(&id).ok_or(StoreError::ItemNotFound(uuid))?;
        record.name = item.name.clone();
        record.due_date = item.due_date;
        record.completion_date = item.completion_date;
        self.replace_labels(id, label_ids);
        debug!(%uuid, "saved item");

        self.notify_items_changed();
        Ok(self.snapshot(id))
    }

    pub fn delete_item(&mut self, uuid: Uuid) -> Result<(), StoreError> {
        let id = self.item_id(uuid)?;
        self.items.remove(&id);
        self.uuids.remove(&uuid);
        self.item_labels.retain(|(item, _)| *item != id);
        debug!(%uuid, "deleted item");

        self.notify_items_changed();
        Ok(())
    }

    pub fn fetch_item(&self, uuid: Uuid) -> Option<Item> {
        self.uuids.get(&uuid).map(|id| self.snapshot(*id))
    }

    /// All items in creation order.
    pub fn fetch_items(&self) -> Vec<Item> {
        self.items.keys().map(|id| self.snapshot(*id)).collect()
    }

    pub fn fetch_items_with_label(&self, label_name: &str) -> Vec<Item> {
        let Some(label_id) = self.label_names.get(label_name) else {
            return Vec::new();
        };
        self.item_labels
            .iter()
            .filter(|(_, label)| label == label_id)
            .map(|(item, _)| self.snapshot(*item))
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    /// Create a label, or recolor the existing label with the same name.
    pub fn create_label(&mut self, name: &str, color: &str) -> Result<Label, StoreError> {
        self.validate_name(name)?;
        self.validate_color(color)?;

        if let Some(id) = self.label_names.get(name).copied() {
            if let Some(record) = self.labels.get_mut(&id) {
                record.color = color.to_string();
            }
            debug!(name, color, "recolored existing label");
            return self.fetch_label_by_id(id);
        }

        let id = LabelId(self.next_label_id);
        self.next_label_id += 1;
        self.labels.insert(
            id,
            LabelRecord {
                name: name.to_string(),
                color: color.to_string(),
            },
        );
        self.label_names.insert(name.to_string(), id);
        debug!(name, color, "created label");
        self.fetch_label_by_id(id)
    }

    /// Persist `label.color` for a stored label. The name is its identity
    /// and cannot be changed.
    pub fn update_label(&mut self, label: &Label) -> Result<Label, StoreError> {
        if label.id.is_none() {
            return Err(StoreError::NotPersisted);
        }
        self.validate_color(&label.color)?;
        let id = self
            .owned_label_id(label)
            .ok_or_else(|| StoreError::LabelNotFound(label.name.clone()))?;
        let record = self
            .labels
            .get_mut(&id)
            .ok_or_else(|| StoreError::LabelNotFound(label.name.clone()))?;
        record.color = label.color.clone();
        debug!(name = %record.name, color = %record.color, "updated label");
        self.fetch_label_by_id(id)
    }

    pub fn fetch_label(&self, name: &str) -> Option<Label> {
        let id = self.label_names.get(name)?;
        self.fetch_label_by_id(*id).ok()
    }

    /// All labels sorted by name.
    pub fn fetch_labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .labels
            .iter()
            .map(|(id, record)| label_from_record(*id, record))
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        labels
    }

    pub fn fetch_labels_for_item(&self, uuid: Uuid) -> Vec<Label> {
        match self.uuids.get(&uuid) {
            Some(id) => self.labels_for(*id),
            None => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn item_id(&self, uuid: Uuid) -> Result<ItemId, StoreError> {
        self.uuids
            .get(&uuid)
            .copied()
            .ok_or(StoreError::ItemNotFound(uuid))
    }

    fn snapshot(&self, id: ItemId) -> Item {
        let record = &self.items[&id];
        Item {
            uuid: Some(record.uuid),
            name: record.name.clone(),
            due_date: record.due_date,
            completion_date: record.completion_date,
            labels: self.labels_for(id),
        }
    }

    fn labels_for(&self, id: ItemId) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .item_labels
            .range((id, LabelId(0))..=(id, LabelId(u64::MAX)))
            .filter_map(|(_, label_id)| {
                self.labels
                    .get(label_id)
                    .map(|record| label_from_record(*label_id, record))
            })
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        labels
    }

    fn fetch_label_by_id(&self, id: LabelId) -> Result<Label, StoreError> {
        self.labels
            .get(&id)
            .map(|record| label_from_record(id, record))
            .ok_or(StoreError::NotPersisted)
    }

    /// Map caller-held labels to stored identities.
    ///
    /// An id only counts when the stored label under it has the same name;
    /// ids are per store, so a label from another `Toodle` falls back to a
    /// lookup by name.
    fn resolve_labels(&self, labels: &[Label]) -> Result<BTreeSet<LabelId>, StoreError> {
        labels
            .iter()
            .map(|label| {
                if let Some(id) = self.owned_label_id(label) {
                    return Ok(id);
                }
                let by_name = self.label_names.get(&label.name).copied();
                match (by_name, label.id) {
                    (Some(id), _) => Ok(id),
                    (None, Some(_)) => Err(StoreError::LabelNotFound(label.name.clone())),
                    (None, None) => Err(StoreError::UnknownLabel(label.name.clone())),
                }
            })
            .collect()
    }

    /// The label's id, if this store holds a label with that id and name.
    fn owned_label_id(&self, label: &Label) -> Option<LabelId> {
        let id = label.id?;
        let record = self.labels.get(&id)?;
        (record.name == label.name).then_some(id)
    }

    fn replace_labels(&mut self, id: ItemId, wanted: BTreeSet<LabelId>) {
        let existing: BTreeSet<LabelId> = self
            .item_labels
            .range((id, LabelId(0))..=(id, LabelId(u64::MAX)))
            .map(|(_, label)| *label)
            .collect();
        for removed in existing.difference(&wanted) {
            self.item_labels.remove(&(id, *removed));
        }
        for added in wanted.difference(&existing) {
            self.item_labels.insert((id, *added));
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            warn!("rejected empty name");
            return Err(StoreError::EmptyName);
        }
        let len = name.chars().count();
        let max = self.config.max_name_length;
        if len > max {
            warn!(len, max, "rejected overlong name");
            return Err(StoreError::NameTooLong { max, len });
        }
        Ok(())
    }

    fn validate_color(&self, color: &str) -> Result<(), StoreError> {
        if color.is_empty() {
            warn!("rejected empty color");
            return Err(StoreError::EmptyColor);
        }
        let len = color.chars().count();
        let max = self.config.max_color_length;
        if len > max {
            warn!(len, max, "rejected overlong color");
            return Err(StoreError::ColorTooLong { max, len });
        }
        Ok(())
    }

    fn notify_items_changed(&mut self) {
        if let Some(callback) = self.items_changed.as_mut() {
            callback();
        }
    }
}

fn label_from_record(id: LabelId, record: &LabelRecord) -> Label {
    Label {
        id: Some(id),
        name: record.name.clone(),
        color: record.color.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn toodle() -> Toodle {
        Toodle::new()
    }

    fn new_item(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            ..NewItem::default()
        }
    }

    #[test]
    fn create_label_assigns_identity() {
        let mut manager = toodle();
        let label = manager.create_label("work", "#000000").unwrap();
        assert!(label.is_persisted());
        assert_eq!(label.name, "work");
        assert_eq!(label.color, "#000000");
    }

    #[test]
    fn create_label_with_existing_name_recolors() {
        let mut manager = toodle();
        let first = manager.create_label("work", "#000000").unwrap();
        let second = manager.create_label("work", "#FFFFFF").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.color, "#FFFFFF");
        assert_eq!(manager.fetch_labels().len(), 1);
    }

    #[test]
    fn create_label_rejects_empty_color() {
        let mut manager = toodle();
        assert_eq!(manager.create_label("work", ""), Err(StoreError::EmptyColor));
        assert!(manager.fetch_labels().is_empty());
    }

    #[test]
    fn fetch_label_by_name() {
        let mut manager = toodle();
        let created = manager.create_label("home", "#00FF00").unwrap();
        assert_eq!(manager.fetch_label("home"), Some(created));
        assert_eq!(manager.fetch_label("doesn't exist"), None);
    }

    #[test]
    fn fetch_labels_sorted_by_name() {
        let mut manager = toodle();
        for name in ["zeta", "alpha", "mu"] {
            manager.create_label(name, "#000000").unwrap();
        }
        let names: Vec<String> = manager.fetch_labels().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn label_color_is_stored_verbatim() {
        let mut manager = toodle();
        let mut label = manager.create_label("work", "#ff0000").unwrap();
        label.color = "#FF0000".to_string();
        let saved = manager.update_label(&label).unwrap();
        assert_eq!(saved.color, "#FF0000");
        assert_eq!(manager.fetch_label("work").unwrap().color, "#FF0000");
    }

    #[test]
    fn update_label_requires_identity() {
        let mut manager = toodle();
        let label = Label::unpersisted("work", "#000000");
        assert_eq!(manager.update_label(&label), Err(StoreError::NotPersisted));
    }

    #[test]
    fn create_item_keeps_fields() {
        let mut manager = toodle();
        let l1 = manager.create_label("label1", "#000000").unwrap();
        let l2 = manager.create_label("label2", "#000000").unwrap();
        let input = NewItem {
            name: "test item".to_string(),
            due_date: Some(Timestamp(1_500_000_000)),
            completion_date: Some(Timestamp(1_500_000_100)),
            labels: vec![l2.clone(), l1.clone()],
        };

        let item = manager.create_item(&input).unwrap();
        assert!(item.uuid.is_some());
        assert_eq!(item.name, "test item");
        assert_eq!(item.due_date, Some(Timestamp(1_500_000_000)));
        assert_eq!(item.completion_date, Some(Timestamp(1_500_000_100)));
        assert_eq!(item.labels, vec![l1, l2]);
    }

    #[test]
    fn create_item_without_dates() {
        let mut manager = toodle();
        let item = manager.create_item(&new_item("bare")).unwrap();
        assert_eq!(item.due_date, None);
        assert_eq!(item.completion_date, None);
        assert!(item.labels.is_empty());
        assert!(!item.is_completed());
    }

    #[test]
    fn create_item_rejects_blank_name() {
        let mut manager = toodle();
        assert_eq!(manager.create_item(&new_item("   ")), Err(StoreError::EmptyName));
        assert_eq!(manager.item_count(), 0);
    }

    #[test]
    fn create_item_rejects_overlong_name() {
        let mut manager = Toodle::with_config(ToodleConfig {
            max_name_length: 3,
            ..ToodleConfig::default()
        });
        assert_eq!(
            manager.create_item(&new_item("four")),
            Err(StoreError::NameTooLong { max: 3, len: 4 })
        );
    }

    #[test]
    fn create_item_rejects_unknown_label() {
        let mut manager = toodle();
        let input = NewItem {
            labels: vec![Label::unpersisted("ghost", "#000000")],
            ..new_item("haunted")
        };
        assert_eq!(
            manager.create_item(&input),
            Err(StoreError::UnknownLabel("ghost".to_string()))
        );
        assert_eq!(manager.item_count(), 0);
    }

    #[test]
    fn unpersisted_label_resolves_by_name() {
        let mut manager = toodle();
        let stored = manager.create_label("work", "#000000").unwrap();
        let input = NewItem {
            labels: vec![Label::unpersisted("work", "#123456")],
            ..new_item("by name")
        };
        let item = manager.create_item(&input).unwrap();
        assert_eq!(item.labels, vec![stored]);
    }

    #[test]
    fn label_from_another_store_does_not_bind_by_id() {
        let mut a = toodle();
        let mut b = toodle();
        let work = a.create_label("work", "#000000").unwrap();
        let home = b.create_label("home", "#FFFFFF").unwrap();
        assert_eq!(work.id, home.id);

        let input = NewItem {
            labels: vec![work.clone()],
            ..new_item("misfiled")
        };
        assert_eq!(
            b.create_item(&input),
            Err(StoreError::LabelNotFound("work".to_string()))
        );
        assert_eq!(b.item_count(), 0);

        let mut foreign = work;
        foreign.color = "#123456".to_string();
        assert_eq!(
            b.update_label(&foreign),
            Err(StoreError::LabelNotFound("work".to_string()))
        );
        assert_eq!(b.fetch_label("home"), Some(home));
    }

    #[test]
    fn label_from_another_store_resolves_by_name() {
        let mut a = toodle();
        let mut b = toodle();
        b.create_label("filler", "#000000").unwrap();
        let work_a = a.create_label("work", "#000000").unwrap();
        let work_b = b.create_label("work", "#111111").unwrap();
        assert_ne!(work_a.id, work_b.id);

        let input = NewItem {
            labels: vec![work_a],
            ..new_item("shared name")
        };
        let item = b.create_item(&input).unwrap();
        assert_eq!(item.labels, vec![work_b]);
    }

    #[test]
    fn fetch_items_in_creation_order() {
        let mut manager = toodle();
        for name in ["c", "a", "b"] {
            manager.create_item(&new_item(name)).unwrap();
        }
        let names: Vec<String> = manager.fetch_items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn fetched_items_are_snapshots() {
        let mut manager = toodle();
        manager.create_item(&new_item("first")).unwrap();
        let snapshot = manager.fetch_items();
        manager.create_item(&new_item("second")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(manager.fetch_items().len(), 2);
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut manager = toodle();
        let label = manager.create_label("work", "#000000").unwrap();
        let created = manager
            .create_item(&NewItem {
                due_date: Some(Timestamp(10)),
                completion_date: Some(Timestamp(20)),
                labels: vec![label],
                ..new_item("stable")
            })
            .unwrap();
        let uuid = created.uuid.unwrap();

        let updated = manager.update_item(uuid, &ItemUpdate::default()).unwrap();
        assert_eq!(updated, created);
        assert_eq!(manager.fetch_item(uuid), Some(created));
    }

    #[test]
    fn update_item_change_name() {
        let mut manager = toodle();
        let uuid = manager.create_item(&new_item("old")).unwrap().uuid.unwrap();
        let update = ItemUpdate {
            name: Some("new".to_string()),
            ..ItemUpdate::default()
        };
        let updated = manager.update_item(uuid, &update).unwrap();
        assert_eq!(updated.name, "new");
    }

    #[test]
    fn update_item_complete_item() {
        let mut manager = toodle();
        let uuid = manager.create_item(&new_item("chore")).unwrap().uuid.unwrap();
        let update = ItemUpdate {
            completion_date: Some(Timestamp(1_600_000_000)),
            ..ItemUpdate::default()
        };
        let updated = manager.update_item(uuid, &update).unwrap();
        assert!(updated.is_completed());
        assert_eq!(updated.due_date, None);
    }

    #[test]
    fn update_item_replaces_label_set() {
        let mut manager = toodle();
        let l1 = manager.create_label("label1", "#000000").unwrap();
        let l2 = manager.create_label("label2", "#000000").unwrap();
        let l3 = manager.create_label("label3", "#000000").unwrap();
        let uuid = manager
            .create_item(&NewItem {
                labels: vec![l1.clone(), l2.clone()],
                ..new_item("tagged")
            })
            .unwrap()
            .uuid
            .unwrap();

        let update = ItemUpdate {
            labels: Some(vec![l2.clone(), l3.clone()]),
            ..ItemUpdate::default()
        };
        let updated = manager.update_item(uuid, &update).unwrap();
        assert_eq!(updated.labels, vec![l2, l3]);
        assert!(manager.fetch_items_with_label("label1").is_empty());
    }

    #[test]
    fn failed_update_leaves_item_untouched() {
        let mut manager = toodle();
        let created = manager.create_item(&new_item("keep")).unwrap();
        let uuid = created.uuid.unwrap();
        let update = ItemUpdate {
            name: Some(String::new()),
            due_date: Some(Timestamp(5)),
            ..ItemUpdate::default()
        };
        assert_eq!(manager.update_item(uuid, &update), Err(StoreError::EmptyName));
        assert_eq!(manager.fetch_item(uuid), Some(created));
    }

    #[test]
    fn update_unknown_item_is_not_found() {
        let mut manager = toodle();
        let uuid = Uuid::nil();
        assert_eq!(
            manager.update_item(uuid, &ItemUpdate::default()),
            Err(StoreError::ItemNotFound(uuid))
        );
    }

    #[test]
    fn save_draft_assigns_uuid() {
        let mut manager = toodle();
        let mut draft = Item::draft();
        draft.name = "drafted".to_string();
        let saved = manager.save_item(&draft).unwrap();
        assert!(saved.uuid.is_some());
        assert_eq!(manager.item_count(), 1);
    }

    #[test]
    fn save_item_persists_cleared_dates() {
        let mut manager = toodle();
        let mut item = manager
            .create_item(&NewItem {
                due_date: Some(Timestamp(42)),
                ..new_item("due")
            })
            .unwrap();
        item.due_date = None;
        manager.save_item(&item).unwrap();
        assert_eq!(manager.fetch_item(item.uuid.unwrap()).unwrap().due_date, None);
    }

    #[test]
    fn delete_item_removes_links() {
        let mut manager = toodle();
        let label = manager.create_label("work", "#000000").unwrap();
        let uuid = manager
            .create_item(&NewItem {
                labels: vec![label],
                ..new_item("gone")
            })
            .unwrap()
            .uuid
            .unwrap();
        manager.delete_item(uuid).unwrap();
        assert_eq!(manager.fetch_item(uuid), None);
        assert!(manager.fetch_items_with_label("work").is_empty());
        assert_eq!(manager.delete_item(uuid), Err(StoreError::ItemNotFound(uuid)));
    }

    #[test]
    fn fetch_items_with_label_filters() {
        let mut manager = toodle();
        let work = manager.create_label("work", "#000000").unwrap();
        manager.create_label("home", "#000000").unwrap();
        manager
            .create_item(&NewItem {
                labels: vec![work],
                ..new_item("report")
            })
            .unwrap();
        manager.create_item(&new_item("untagged")).unwrap();

        let items = manager.fetch_items_with_label("work");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "report");
        assert!(manager.fetch_items_with_label("home").is_empty());
        assert!(manager.fetch_items_with_label("missing").is_empty());
    }

    #[test]
    fn items_changed_fires_on_mutation() {
        let mut manager = toodle();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        manager.set_items_changed(Some(Box::new(move || counter.set(counter.get() + 1))));

        let uuid = manager.create_item(&new_item("watched")).unwrap().uuid.unwrap();
        manager
            .update_item(
                uuid,
                &ItemUpdate {
                    name: Some("renamed".to_string()),
                    ..ItemUpdate::default()
                },
            )
            .unwrap();
        manager.update_item(uuid, &ItemUpdate::default()).unwrap();
        manager.create_label("not an item", "#000000").unwrap();
        manager.delete_item(uuid).unwrap();
        assert_eq!(calls.get(), 3);
    }
}
