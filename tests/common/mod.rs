#![allow(dead_code)]

use dataset::{DataItem, Dataset, DatasetBuilder, DatasetObserver, Key, LoadOptions};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Notification names in the order they fired.
#[derive(Debug, Default)]
pub struct Log {
    entries: RefCell<Vec<String>>,
}

impl Log {
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn push(&self, entry: String) {
        self.entries.borrow_mut().push(entry);
    }
}

fn keys(items: &[&DataItem]) -> String {
    let keys: Vec<&str> = items.iter().map(|item| item.key().as_str()).collect();
    keys.join(",")
}

impl DatasetObserver for Log {
    fn on_dataset_change(&self, dataset: &Dataset) {
        self.push(format!("dataset {}", dataset.len()));
    }

    fn on_current_change(&self, current: Option<&DataItem>) {
        let key = current.map(|item| item.key().to_string()).unwrap_or_default();
        self.push(format!("current {}", key));
    }

    fn on_selection_change(&self, selected: &[&DataItem]) {
        self.push(format!("selection {}", keys(selected)));
    }

    fn on_append(&self, appended: &[&DataItem]) {
        self.push(format!("append {}", keys(appended)));
    }

    fn on_modify(&self, changed: &[String], item: &DataItem, _is_current: bool) {
        self.push(format!("modify {} {}", item.key(), changed.join(",")));
    }

    fn on_modify_rejected(&self, item: &DataItem, _is_current: bool) {
        self.push(format!("rejected {}", item.key()));
    }

    fn on_remove(&self, removed: &[&DataItem]) {
        self.push(format!("remove {}", keys(removed)));
    }

    fn on_erase(&self, erased: &[DataItem]) {
        let keys: Vec<&str> = erased.iter().map(|item| item.key().as_str()).collect();
        self.push(format!("erase {}", keys.join(",")));
    }

    fn on_dirty_state_change(&self, dirty: bool) {
        self.push(format!("dirty {}", dirty));
    }
}

/// Store keyed by `id` holding `records`, with a fresh log.
pub fn keyed_store(records: Vec<Value>) -> (Dataset, Rc<Log>) {
    let log = Rc::new(Log::default());
    let mut dataset = DatasetBuilder::new()
        .key_properties(["id"])
        .observer(log.clone())
        .build()
        .unwrap();
    dataset.set_data(records, LoadOptions::default()).unwrap();
    log.clear();
    (dataset, log)
}

pub fn ab_store() -> (Dataset, Rc<Log>) {
    keyed_store(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})])
}

pub fn key(n: i64) -> Key {
    Key::from(n)
}
