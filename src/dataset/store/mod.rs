//! # The Record Store
//!
//! [`Dataset`] owns an ordered sequence of [`DataItem`]s, an identity index
//! over it, the current cursor, the selection and the dirty aggregate.
//!
//! ## Layout
//!
//! The store's API is split by concern, one `impl Dataset` block per file:
//!
//! - [`load`]: baseline and local loads, clearing
//! - [`modify`]: record edits and value access
//! - [`remove`]: soft removal and physical erasure
//! - [`replace`]: substituting records after an external commit
//! - [`selection`]: bulk selection changes
//! - [`cursor`]: the current item
//! - [`state`]: snapshot and restore of cursor and selection
//! - [`render`]: template substitution over the reachable items
//!
//! Queries live here, alongside the notification plumbing every mutation
//! shares.
//!
//! ## Invariants
//!
//! - Every item is in the index under its key and the index holds nothing else.
//! - `current`, when set, names a reachable item.
//! - The cached dirty flag equals "some item is dirty" after every public call.

use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::filter::{Filter, Reach};
use crate::format::FormatRegistry;
use crate::identity::IdentityStrategy;
use crate::item::DataItem;
use crate::model::{ItemState, Key, Record};
use crate::observer::DatasetObserver;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub mod cursor;
pub mod load;
pub mod modify;
pub mod remove;
pub mod render;
pub mod replace;
pub mod selection;
pub mod state;

pub use load::LoadOptions;
pub use replace::Replacement;
pub use state::{Anchor, DatasetState};

const TARGET: &str = "dataset";

/// Dirty items grouped by state.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyPartition<T> {
    pub added: Vec<T>,
    pub modified: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for DirtyPartition<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> DirtyPartition<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// An in-memory record store with change tracking.
pub struct Dataset {
    items: Vec<DataItem>,
    index: HashMap<Key, usize>,
    current: Option<Key>,
    dirty: bool,
    identity: Box<dyn IdentityStrategy>,
    formats: Rc<FormatRegistry>,
    observer: Rc<dyn DatasetObserver>,
    trace: bool,
    state_keys: Vec<String>,
    records_pointer: Option<String>,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("items", &self.items)
            .field("current", &self.current)
            .field("dirty", &self.dirty)
            .field("derived_identity", &self.identity.is_derived())
            .finish()
    }
}

impl Dataset {
    pub(crate) fn from_parts(
        identity: Box<dyn IdentityStrategy>,
        formats: Rc<FormatRegistry>,
        observer: Rc<dyn DatasetObserver>,
        config: DatasetConfig,
    ) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            current: None,
            dirty: false,
            identity,
            formats,
            observer,
            trace: config.trace,
            state_keys: config.state_keys,
            records_pointer: config.records_pointer,
        }
    }

    /// Number of reachable items.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| !item.is_unreachable()).count()
    }

    /// Whether no item is reachable. Unreachable items may still be held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn get_items(&self, filter: &Filter) -> Vec<&DataItem> {
        self.positions(filter, Reach::Lookup)
            .into_iter()
            .map(|pos| &self.items[pos])
            .collect()
    }

    pub fn get_data(&self, filter: &Filter) -> Vec<&Record> {
        self.get_items(filter)
            .into_iter()
            .filter_map(DataItem::record)
            .collect()
    }

    /// First item matching `filter`.
    pub fn get_item(&self, filter: &Filter) -> Option<&DataItem> {
        self.get_items(filter).into_iter().next()
    }

    /// The only item matching `filter`; fails on no match or several matches.
    pub fn get_item_strict(&self, filter: &Filter) -> Result<&DataItem> {
        let pos = self.position_strict(filter, Reach::Lookup)?;
        Ok(&self.items[pos])
    }

    pub fn get_info(&self, filter: &Filter) -> Option<&Record> {
        self.get_item(filter).and_then(DataItem::record)
    }

    pub fn get_info_strict(&self, filter: &Filter) -> Result<&Record> {
        let item = self.get_item_strict(filter)?;
        item.record()
            .ok_or_else(|| DatasetError::NotFound(filter.to_string()))
    }

    pub fn keys(&self, filter: &Filter) -> Vec<Key> {
        self.get_items(filter)
            .into_iter()
            .map(|item| item.key().clone())
            .collect()
    }

    pub fn dirty_items(&self) -> DirtyPartition<&DataItem> {
        let mut partition = DirtyPartition::default();
        for item in &self.items {
            match item.state() {
                ItemState::Added => partition.added.push(item),
                ItemState::Modified => partition.modified.push(item),
                ItemState::Removed => partition.removed.push(item),
                ItemState::Clean | ItemState::Ignored => {}
            }
        }
        partition
    }

    pub fn dirty_data(&self) -> DirtyPartition<&Record> {
        let items = self.dirty_items();
        DirtyPartition {
            added: records(items.added),
            modified: records(items.modified),
            removed: records(items.removed),
        }
    }

    /// Positions of the items matching `filter`, in sequence order.
    pub(crate) fn positions(&self, filter: &Filter, reach: Reach) -> Vec<usize> {
        if let Filter::Id(key) = filter {
            return self
                .index
                .get(key)
                .copied()
                .filter(|&pos| filter.test(&self.items[pos], reach))
                .into_iter()
                .collect();
        }
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| filter.test(item, reach))
            .map(|(pos, _)| pos)
            .collect()
    }

    pub(crate) fn position_strict(&self, filter: &Filter, reach: Reach) -> Result<usize> {
        match self.positions(filter, reach).as_slice() {
            [] => Err(DatasetError::NotFound(filter.to_string())),
            [pos] => Ok(*pos),
            many => Err(DatasetError::Ambiguous {
                filter: filter.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Positions of the reachable items, in sequence order.
    pub(crate) fn reachable_positions(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_unreachable())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub(crate) fn position_of(&self, key: &Key) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.key().clone(), pos))
            .collect();
    }

    fn trace_event(&self, event: &str) {
        if self.trace {
            debug!(target: TARGET, event, len = self.items.len(), "Notifying");
        }
    }

    pub(crate) fn notify_dataset(&self) {
        self.trace_event("dataset");
        let observer = Rc::clone(&self.observer);
        observer.on_dataset_change(self);
    }

    pub(crate) fn notify_current(&self) {
        self.trace_event("current");
        self.observer.on_current_change(self.current());
    }

    pub(crate) fn notify_selection(&self) {
        self.trace_event("selection");
        self.observer
            .on_selection_change(&self.get_items(&Filter::selected()));
    }

    pub(crate) fn notify_append(&self, positions: &[usize]) {
        self.trace_event("append");
        self.observer.on_append(&self.items_at(positions));
    }

    pub(crate) fn notify_modify(&self, changed: &[String], pos: usize, is_current: bool) {
        self.trace_event("modify");
        self.observer.on_modify(changed, &self.items[pos], is_current);
    }

    pub(crate) fn notify_modify_rejected(&self, pos: usize, is_current: bool) {
        self.trace_event("modify-rejected");
        self.observer.on_modify_rejected(&self.items[pos], is_current);
    }

    pub(crate) fn notify_replace(&self, positions: &[usize]) {
        self.trace_event("replace");
        self.observer.on_replace(&self.items_at(positions));
    }

    pub(crate) fn notify_remove(&self, positions: &[usize]) {
        self.trace_event("remove");
        self.observer.on_remove(&self.items_at(positions));
    }

    pub(crate) fn notify_erase(&self, erased: &[DataItem]) {
        self.trace_event("erase");
        self.observer.on_erase(erased);
    }

    /// Recomputes the dirty aggregate and notifies when it flipped.
    pub(crate) fn refresh_dirty(&mut self) {
        let dirty = self.items.iter().any(DataItem::is_dirty);
        if dirty != self.dirty {
            self.dirty = dirty;
            self.trace_event("dirty");
            self.observer.on_dirty_state_change(dirty);
        }
    }

    fn items_at(&self, positions: &[usize]) -> Vec<&DataItem> {
        positions.iter().map(|&pos| &self.items[pos]).collect()
    }
}

fn records<'a>(items: Vec<&'a DataItem>) -> Vec<&'a Record> {
    items.into_iter().filter_map(DataItem::record).collect()
}

#[cfg(test)]
mod tests {
    use crate::filter::{Filter, Status};
    use crate::config::DatasetBuilder;
    use crate::fixtures::{numbered, DatasetFixture, Event};
    use crate::model::{ItemState, Key};
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn trace_logs_each_notification() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (mut dataset, recorder) = DatasetFixture::from_builder(
            DatasetBuilder::new().key_properties(["id"]).trace(true),
        )
        .with_records(2)
        .into_parts();
        recorder.clear();

        tracing::subscriber::with_default(subscriber, || {
            dataset.set_value(&Filter::id(1), "name", "z").unwrap();
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("event=\"modify\""));
        assert!(output.contains("event=\"dirty\""));
        assert_eq!(recorder.count(|e| matches!(e, Event::Modify(..))), 1);
    }

    #[test]
    fn queries_by_identity() {
        let (dataset, _) = numbered(3);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get_info(&Filter::id(2)).unwrap()["name"], json!("n2"));
        assert!(dataset.get_info(&Filter::id(9)).is_none());
        assert_eq!(
            dataset.keys(&Filter::ids([3, 1])),
            vec![Key::from(1), Key::from(3)]
        );
    }

    #[test]
    fn strict_lookup_errors() {
        let (dataset, _) = numbered(3);
        assert!(matches!(
            dataset.get_item_strict(&Filter::id(9)),
            Err(crate::DatasetError::NotFound(_))
        ));
        assert!(matches!(
            dataset.get_item_strict(&Filter::all()),
            Err(crate::DatasetError::Ambiguous { count: 3, .. })
        ));
        assert!(dataset.get_info_strict(&Filter::id(1)).is_ok());
    }

    #[test]
    fn property_queries_match_any_probe() {
        let (dataset, _) = numbered(3);
        let found = dataset.get_data(&Filter::any_properties([
            json!({"name": "n1"}),
            json!({"id": "3"}),
        ]));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn dirty_partition_groups_by_state() {
        let (mut dataset, _) = numbered(3);
        dataset.set_value(&Filter::id(1), "name", json!("x")).unwrap();
        dataset.remove(&Filter::id(2));
        dataset
            .add_record(json!({"id": 4, "name": "n4"}), crate::LoadOptions::local())
            .unwrap();

        let dirty = dataset.dirty_data();
        assert!(!dirty.is_empty());
        assert_eq!(dirty.len(), 3);
        assert_eq!(dirty.added[0]["id"], json!(4));
        assert_eq!(dirty.modified[0]["id"], json!(1));
        assert_eq!(dirty.removed[0]["id"], json!(2));
        assert_eq!(dataset.get_items(&Filter::dirty()).len(), 3);
        assert_eq!(dataset.get_items(&Filter::Status(Status::Removed)).len(), 1);
    }

    #[test]
    fn removed_items_stay_addressable_by_identity() {
        let (mut dataset, _) = numbered(2);
        dataset.remove(&Filter::id(2));

        let item = dataset.get_item(&Filter::id(2)).unwrap();
        assert_eq!(item.state(), ItemState::Removed);
        assert!(dataset.get_items(&Filter::all()).iter().all(|i| i.key() != &Key::from(2)));
    }

    #[test]
    fn dirty_flag_notifies_on_edges_only() {
        let (mut dataset, recorder) = numbered(2);
        recorder.clear();

        dataset.set_value(&Filter::id(1), "name", json!("x")).unwrap();
        dataset.set_value(&Filter::id(2), "name", json!("y")).unwrap();

        let flips: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Dirty(_)))
            .collect();
        assert_eq!(flips, vec![Event::Dirty(true)]);
        assert!(dataset.is_dirty());
    }
}
