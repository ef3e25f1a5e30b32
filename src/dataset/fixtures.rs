// --- Test Fixtures ---

use crate::config::DatasetBuilder;
use crate::item::DataItem;
use crate::model::Key;
use crate::observer::DatasetObserver;
use crate::store::{Dataset, LoadOptions};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// One notification, reduced to the keys it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Reachable length at notification time.
    Dataset(usize),
    Current(Option<Key>),
    Selection(Vec<Key>),
    Append(Vec<Key>),
    Modify(Vec<String>, Key, bool),
    ModifyRejected(Key, bool),
    Replace(Vec<Key>),
    Remove(Vec<Key>),
    Erase(Vec<Key>),
    Dirty(bool),
}

/// Observer keeping every notification in order.
#[derive(Debug, Default)]
pub struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn count(&self, test: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| test(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

fn keys(items: &[&DataItem]) -> Vec<Key> {
    items.iter().map(|item| item.key().clone()).collect()
}

impl DatasetObserver for Recorder {
    fn on_dataset_change(&self, dataset: &Dataset) {
        self.push(Event::Dataset(dataset.len()));
    }

    fn on_current_change(&self, current: Option<&DataItem>) {
        self.push(Event::Current(current.map(|item| item.key().clone())));
    }

    fn on_selection_change(&self, selected: &[&DataItem]) {
        self.push(Event::Selection(keys(selected)));
    }

    fn on_append(&self, appended: &[&DataItem]) {
        self.push(Event::Append(keys(appended)));
    }

    fn on_modify(&self, changed: &[String], item: &DataItem, is_current: bool) {
        self.push(Event::Modify(changed.to_vec(), item.key().clone(), is_current));
    }

    fn on_modify_rejected(&self, item: &DataItem, is_current: bool) {
        self.push(Event::ModifyRejected(item.key().clone(), is_current));
    }

    fn on_replace(&self, replaced: &[&DataItem]) {
        self.push(Event::Replace(keys(replaced)));
    }

    fn on_remove(&self, removed: &[&DataItem]) {
        self.push(Event::Remove(keys(removed)));
    }

    fn on_erase(&self, erased: &[DataItem]) {
        self.push(Event::Erase(
            erased.iter().map(|item| item.key().clone()).collect(),
        ));
    }

    fn on_dirty_state_change(&self, dirty: bool) {
        self.push(Event::Dirty(dirty));
    }
}

/// Records `{"id": i, "name": "n<i>"}` for `i` in `1..=count`.
pub fn numbered_records(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| json!({"id": i, "name": format!("n{}", i)}))
        .collect()
}

pub struct DatasetFixture {
    pub dataset: Dataset,
    pub recorder: Rc<Recorder>,
}

impl DatasetFixture {
    /// Empty store keyed by the `id` property.
    pub fn keyed() -> Self {
        Self::from_builder(DatasetBuilder::new().key_properties(["id"]))
    }

    /// Empty store with surrogate identity, carrying state by `id`.
    pub fn surrogate() -> Self {
        Self::from_builder(DatasetBuilder::new().surrogate().state_keys(["id"]))
    }

    pub fn from_builder(builder: DatasetBuilder) -> Self {
        let recorder = Rc::new(Recorder::default());
        let dataset = builder
            .observer(recorder.clone())
            .build()
            .expect("fixture builder has an identity");
        Self { dataset, recorder }
    }

    pub fn with_records(mut self, count: usize) -> Self {
        self.dataset
            .set_data(numbered_records(count), LoadOptions::default())
            .expect("numbered records are valid");
        self
    }

    pub fn into_parts(self) -> (Dataset, Rc<Recorder>) {
        (self.dataset, self.recorder)
    }
}

/// Store keyed by `id` holding `count` numbered baseline records.
pub fn numbered(count: usize) -> (Dataset, Rc<Recorder>) {
    DatasetFixture::keyed().with_records(count).into_parts()
}
