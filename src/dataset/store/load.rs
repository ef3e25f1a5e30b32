use super::{Anchor, Dataset};
use crate::error::{DatasetError, Result};
use crate::item::DataItem;
use crate::model::{ItemState, Key};
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;

/// How a batch of records enters the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Carry the current item and selection over a full reload.
    pub stateful: bool,
    /// The records are new locally and enter in the `added` state.
    pub local: bool,
}

impl LoadOptions {
    pub fn stateful() -> Self {
        Self {
            stateful: true,
            local: false,
        }
    }

    pub fn local() -> Self {
        Self {
            stateful: false,
            local: true,
        }
    }
}

impl Dataset {
    /// Replaces every item with `records`.
    ///
    /// Without `stateful` the first reachable item becomes current and nothing
    /// is selected. Invalid input fails before the store is touched.
    pub fn set_data(&mut self, records: Vec<Value>, options: LoadOptions) -> Result<()> {
        let state = options.stateful.then(|| self.get_state());
        let items = self.build_items(records, options.local, false)?;

        self.items = items;
        self.reindex();
        self.current = None;

        self.apply_state(state);
        Ok(())
    }

    /// Appends `records` after the held items. The first appended item becomes current.
    ///
    /// On a store holding no items this is [`Dataset::set_data`].
    pub fn add_data(&mut self, records: Vec<Value>, options: LoadOptions) -> Result<()> {
        if self.items.is_empty() {
            return self.set_data(records, options);
        }

        let items = self.build_items(records, options.local, true)?;
        let Some(first) = items.first().map(|item| item.key().clone()) else {
            return Ok(());
        };

        let mut state = self.snapshot();
        state.current = Some(Anchor::Key(first));

        let start = self.items.len();
        self.items.extend(items);
        self.reindex();

        let appended: Vec<usize> = (start..self.items.len()).collect();
        self.notify_append(&appended);
        self.apply_state(Some(state));
        Ok(())
    }

    pub fn add_record(&mut self, record: Value, options: LoadOptions) -> Result<()> {
        self.add_data(vec![record], options)
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
        self.current = None;
        self.apply_state(None);
    }

    /// Loads a JSON array, or an object holding one at the configured records pointer.
    ///
    /// `null` clears the store.
    pub fn load_json(&mut self, data: Value, options: LoadOptions) -> Result<()> {
        match data {
            Value::Null => {
                self.clear();
                Ok(())
            }
            Value::Array(records) => self.set_data(records, options),
            Value::Object(object) => {
                let data = Value::Object(object);
                let records = self
                    .records_pointer
                    .as_deref()
                    .and_then(|pointer| data.pointer(pointer))
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or(DatasetError::NotAnArray)?;
                self.set_data(records, options)
            }
            _ => Err(DatasetError::NotAnArray),
        }
    }

    pub fn load_json_str(&mut self, text: &str, options: LoadOptions) -> Result<()> {
        let data: Value = serde_json::from_str(text)?;
        self.load_json(data, options)
    }

    /// Wraps and identifies `records` without touching the store.
    ///
    /// With `appending`, identities already held count as duplicates.
    fn build_items(
        &mut self,
        records: Vec<Value>,
        local: bool,
        appending: bool,
    ) -> Result<Vec<DataItem>> {
        let state = if local {
            ItemState::Added
        } else {
            ItemState::Clean
        };
        let mut seen: HashSet<Key> = HashSet::with_capacity(records.len());
        let mut items = Vec::with_capacity(records.len());

        for (pos, value) in records.into_iter().enumerate() {
            let Value::Object(record) = value else {
                return Err(DatasetError::NotAnObject(pos));
            };
            let key = self
                .identity
                .identify(&record)
                .ok_or(DatasetError::Unidentifiable(pos))?;
            if (appending && self.index.contains_key(&key)) || !seen.insert(key.clone()) {
                return Err(DatasetError::DuplicateKey(key));
            }

            let mut item = DataItem::new(key, record, Rc::clone(&self.formats));
            item.set_state(state);
            items.push(item);
        }
        Ok(items)
    }
}
