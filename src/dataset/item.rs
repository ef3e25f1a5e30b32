use crate::format::{FormatRegistry, InvalidValue};
use crate::model::{loose_eq, ItemState, Key, Record};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde_json::Value;
use std::rc::Rc;

static INDEX_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{index\}").expect("valid pattern"));

/// Wraps one user record with its identity, selection flag and lifecycle state.
///
/// The state is only changed by the owning [`crate::Dataset`]; a `DataItem`
/// handed to a modifier can change its record and selection, nothing else.
#[derive(Debug, Clone)]
pub struct DataItem {
    key: Key,
    record: Option<Record>,
    selected: bool,
    state: ItemState,
    formats: Rc<FormatRegistry>,
}

impl DataItem {
    pub fn new(key: Key, record: Record, formats: Rc<FormatRegistry>) -> Self {
        Self {
            key,
            record: Some(record),
            selected: false,
            state: ItemState::Clean,
            formats,
        }
    }

    /// An item holding no record.
    pub fn empty(key: Key, formats: Rc<FormatRegistry>) -> Self {
        Self {
            key,
            record: None,
            selected: false,
            state: ItemState::Clean,
            formats,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Direct access to the record. Changes made here are only noticed by the
    /// store when they happen inside [`crate::Dataset::modify`].
    pub fn record_mut(&mut self) -> Option<&mut Record> {
        self.record.as_mut()
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn is_unreachable(&self) -> bool {
        self.state.is_unreachable()
    }

    pub fn is_new(&self) -> bool {
        self.state == ItemState::Added
    }

    pub fn is_empty(&self) -> bool {
        self.record.as_ref().map_or(true, |r| r.is_empty())
    }

    /// Sets the selection flag, returning whether it changed.
    pub fn select(&mut self, selected: bool) -> bool {
        let changed = self.selected != selected;
        self.selected = selected;
        changed
    }

    /// Flips the selection flag, returning the new value.
    pub fn toggle(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }

    /// Formatted value of `property`; empty when the item holds no record.
    pub fn get_value(&self, property: &str) -> String {
        let Some(record) = &self.record else {
            return String::new();
        };
        let value = record.get(property).unwrap_or(&Value::Null);
        self.formats.lookup(property).format(value)
    }

    /// Parses `raw` and writes it to `property` unless parsing failed.
    ///
    /// The parse result is returned either way so a caller can detect a rejected edit.
    pub fn set_value(&mut self, property: &str, raw: &Value) -> Result<Value, InvalidValue> {
        let parsed = self.formats.lookup(property).parse(raw)?;
        if let Some(record) = &mut self.record {
            record.insert(property.to_string(), parsed.clone());
        }
        Ok(parsed)
    }

    /// Subset of the record holding only `names`.
    pub fn properties(&self, names: &[String]) -> Record {
        names
            .iter()
            .map(|name| {
                let value = self
                    .record
                    .as_ref()
                    .and_then(|r| r.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }

    /// Whether every property of `probe` loosely equals the record's. False for an empty probe.
    pub fn equal_properties(&self, probe: &Record) -> bool {
        if probe.is_empty() {
            return false;
        }
        let record = self.record.as_ref();
        probe.iter().all(|(name, expected)| {
            let actual = record.and_then(|r| r.get(name)).unwrap_or(&Value::Null);
            loose_eq(expected, actual)
        })
    }

    /// Fills `template` with the formatted values of this item.
    ///
    /// Every record property replaces its `{property}` placeholders, then `{index}`
    /// (any case) is replaced by the item's key. Unknown placeholders are left as is.
    pub fn in_string(&self, template: &str) -> String {
        let mut text = template.to_string();
        if let Some(record) = &self.record {
            for property in record.keys() {
                let pattern = self.formats.placeholder(property);
                if pattern.is_match(&text) {
                    let value = self.get_value(property);
                    text = pattern.replace_all(&text, NoExpand(&value)).into_owned();
                }
            }
        }
        INDEX_PLACEHOLDER
            .replace_all(&text, NoExpand(self.key.as_str()))
            .into_owned()
    }

    /// Like [`DataItem::in_string`], letting `custom` rewrite its own placeholders first.
    pub fn in_string_with<F>(&self, template: &str, custom: F) -> String
    where
        F: Fn(&str, &DataItem) -> String,
    {
        let converted = custom(template, self);
        self.in_string(&converted)
    }

    pub(crate) fn set_state(&mut self, state: ItemState) {
        self.state = state;
    }

    /// Swaps in a new record and key, resetting the state to clean.
    pub(crate) fn replace(&mut self, key: Key, record: Record) {
        self.key = key;
        self.record = Some(record);
        self.state = ItemState::Clean;
    }
}
