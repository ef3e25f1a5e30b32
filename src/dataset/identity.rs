//! # Record Identity: Derived Keys vs Surrogate Keys
//!
//! Every record held by a [`crate::Dataset`] is addressed by a [`Key`]. The key is
//! assigned once, when the record enters the store, and never changes while the
//! record stays there (a modification that touches a key property does not re-key
//! the record; [`crate::Dataset::replace`] does).
//!
//! ## Two Identity Modes
//!
//! 1. **Derived**: The key is computed from the record itself, either from a list of
//!    properties ([`PropertyKey`]) or from a caller supplied function ([`KeyMapper`]).
//!    Because the key is reproducible from content, the same record loaded again
//!    gets the same key. State snapshots across reloads are therefore keyed by
//!    identity directly.
//! 2. **Surrogate**: The key is an opaque token (`ndx-<millis>-<n>`) issued by a
//!    counter ([`SurrogateKey`]). It says nothing about the record and is not
//!    reproducible, so state snapshots fall back to configured key properties.
//!
//! Exactly one mode is active per store. The store rejects a load whose records
//! cannot be identified, or whose keys collide with each other or with a key
//! already held.

use crate::model::{Key, Record};
use serde_json::Value;
use std::fmt;

/// Strategy producing the identity of a record at insertion time.
pub trait IdentityStrategy {
    /// Identity for `record`, or `None` when it cannot be identified.
    fn identify(&mut self, record: &Record) -> Option<Key>;

    /// Whether identities are reproducible from record content.
    fn is_derived(&self) -> bool {
        true
    }

    /// Properties the identity is derived from, if known.
    fn key_properties(&self) -> &[String] {
        &[]
    }
}

/// Derived identity over one or more record properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKey {
    properties: Vec<String>,
}

impl PropertyKey {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl IdentityStrategy for PropertyKey {
    fn identify(&mut self, record: &Record) -> Option<Key> {
        match self.properties.as_slice() {
            [] => None,
            [single] => record.get(single).and_then(Key::from_value),
            many => {
                let values: Vec<&Value> = many
                    .iter()
                    .map(|p| record.get(p).unwrap_or(&Value::Null))
                    .collect();
                Key::composite(&values)
            }
        }
    }

    fn key_properties(&self) -> &[String] {
        &self.properties
    }
}

/// Derived identity computed by a caller supplied function.
pub struct KeyMapper {
    mapper: Box<dyn Fn(&Record) -> Option<Key>>,
}

impl KeyMapper {
    pub fn new(mapper: impl Fn(&Record) -> Option<Key> + 'static) -> Self {
        Self {
            mapper: Box::new(mapper),
        }
    }
}

impl fmt::Debug for KeyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMapper")
    }
}

impl IdentityStrategy for KeyMapper {
    fn identify(&mut self, record: &Record) -> Option<Key> {
        (self.mapper)(record)
    }
}

/// Surrogate identity issued from a counter.
///
/// The counter never restarts for the lifetime of the strategy, so keys issued
/// by different loads of the same store never collide.
#[derive(Debug, Clone)]
pub struct SurrogateKey {
    prefix: String,
    next: u64,
}

impl Default for SurrogateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl SurrogateKey {
    pub fn new() -> Self {
        Self::with_prefix(format!("ndx-{}-", chrono::Utc::now().timestamp_millis()))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdentityStrategy for SurrogateKey {
    fn identify(&mut self, _record: &Record) -> Option<Key> {
        let key = Key::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        Some(key)
    }

    fn is_derived(&self) -> bool {
        false
    }
}
