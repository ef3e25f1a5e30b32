//! Filter resolution.
//!
//! A [`Filter`] says which records a query or mutation applies to. It is
//! resolved once per call into a predicate over [`DataItem`]s.
//!
//! Property, predicate and the `All`/`Selected` filters only see reachable
//! items; soft-removed records drop out of them. The state filters (`Dirty`,
//! `Added`, `Modified`, `Removed`) see the states they name whether reachable
//! or not.
//!
//! Identity filters depend on the caller. Read queries address a record by
//! identity until it is erased, so a soft-removed record can still be looked
//! at. Mutations (select, modify, remove, cursor moves) only reach live items.

use crate::item::DataItem;
use crate::model::{ItemState, Key, Record};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Keyword filters over the lifecycle and selection state of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Every reachable item.
    #[default]
    All,
    /// Reachable, selected items.
    Selected,
    /// Added, modified or removed items.
    Dirty,
    Added,
    Modified,
    Removed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::All => "all",
            Status::Selected => "selected",
            Status::Dirty => "dirty",
            Status::Added => "added",
            Status::Modified => "modified",
            Status::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// Which items a filter may reach besides the ones its kind defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reach {
    /// Reachable items only.
    Reachable,
    /// Reachable items, plus unreachable ones named by identity.
    Lookup,
    /// Every item held by the store.
    Any,
}

/// Selects items of a [`crate::Dataset`].
#[derive(Clone)]
pub enum Filter {
    Id(Key),
    Ids(Vec<Key>),
    Status(Status),
    /// Items whose record matches ANY of the property sets.
    Properties(Vec<Record>),
    Predicate(Rc<dyn Fn(&DataItem) -> bool>),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Status(Status::All)
    }
}

impl Filter {
    pub fn id(key: impl Into<Key>) -> Self {
        Filter::Id(key.into())
    }

    pub fn ids<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Filter::Ids(keys.into_iter().map(Into::into).collect())
    }

    pub fn all() -> Self {
        Filter::Status(Status::All)
    }

    pub fn selected() -> Self {
        Filter::Status(Status::Selected)
    }

    pub fn dirty() -> Self {
        Filter::Status(Status::Dirty)
    }

    /// Items whose record matches every property of `probe`.
    ///
    /// A non-object probe, or an empty one, matches nothing.
    pub fn properties(probe: Value) -> Self {
        Filter::Properties(vec![probe_record(probe)])
    }

    /// Items matching any of the `probes`.
    pub fn any_properties<I>(probes: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Filter::Properties(probes.into_iter().map(probe_record).collect())
    }

    pub fn predicate(test: impl Fn(&DataItem) -> bool + 'static) -> Self {
        Filter::Predicate(Rc::new(test))
    }

    /// Whether `item` passes this filter.
    pub fn matches(&self, item: &DataItem) -> bool {
        self.test(item, Reach::Reachable)
    }

    pub(crate) fn test(&self, item: &DataItem, reach: Reach) -> bool {
        let reachable = reach == Reach::Any || !item.is_unreachable();
        let addressable = reachable || reach == Reach::Lookup;
        match self {
            Filter::Id(key) => addressable && item.key() == key,
            Filter::Ids(keys) => addressable && keys.contains(item.key()),
            Filter::Status(status) => match status {
                Status::All => reachable,
                Status::Selected => reachable && item.is_selected(),
                Status::Dirty => item.is_dirty(),
                Status::Added => item.state() == ItemState::Added,
                Status::Modified => item.state() == ItemState::Modified,
                Status::Removed => item.state() == ItemState::Removed,
            },
            Filter::Properties(probes) => {
                reachable && probes.iter().any(|probe| item.equal_properties(probe))
            }
            Filter::Predicate(test) => reachable && test(item),
        }
    }
}

fn probe_record(probe: Value) -> Record {
    match probe {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}

impl From<Key> for Filter {
    fn from(key: Key) -> Self {
        Filter::Id(key)
    }
}

impl From<Status> for Filter {
    fn from(status: Status) -> Self {
        Filter::Status(status)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Id(key) => f.debug_tuple("Id").field(key).finish(),
            Filter::Ids(keys) => f.debug_tuple("Ids").field(keys).finish(),
            Filter::Status(status) => f.debug_tuple("Status").field(status).finish(),
            Filter::Properties(probes) => f.debug_tuple("Properties").field(probes).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Id(key) => write!(f, "{}", key),
            Filter::Ids(keys) => {
                let s: Vec<&str> = keys.iter().map(Key::as_str).collect();
                write!(f, "[{}]", s.join(", "))
            }
            Filter::Status(status) => write!(f, "{}", status),
            Filter::Properties(probes) => {
                let s: Vec<String> = probes
                    .iter()
                    .map(|p| Value::Object(p.clone()).to_string())
                    .collect();
                write!(f, "{}", s.join(" | "))
            }
            Filter::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}
