use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An opaque user record. The store only looks at the properties it is told about.
pub type Record = Map<String, Value>;

/// Stable identity of a record held by a [`crate::Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key text of a single JSON value. `null` has no key.
    ///
    /// Strings are taken verbatim so that `{"id": "a"}` and `{"id": 1}` are
    /// addressed as `a` and `1`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            other => Some(Self(other.to_string())),
        }
    }

    /// Key over several values, written as the JSON array of those values.
    pub fn composite(values: &[&Value]) -> Option<Self> {
        if values.iter().all(|v| v.is_null()) {
            return None;
        }
        let array = Value::Array(values.iter().map(|v| (*v).clone()).collect());
        Some(Self(array.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

macro_rules! key_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Key {
                fn from(n: $t) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

key_from_integer!(i32, i64, u32, u64, usize);

/// Lifecycle state of a record relative to the baseline it was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Clean,
    Added,
    Modified,
    Removed,
    /// Added and then removed before ever being committed.
    Ignored,
}

impl ItemState {
    pub fn is_dirty(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Removed)
    }

    pub fn is_unreachable(self) -> bool {
        matches!(self, Self::Removed | Self::Ignored)
    }

    /// State after a successful modification.
    pub(crate) fn modified(self) -> Self {
        match self {
            Self::Clean => Self::Modified,
            other => other,
        }
    }

    /// State after a soft removal.
    pub(crate) fn removed(self) -> Self {
        match self {
            Self::Added | Self::Ignored => Self::Ignored,
            _ => Self::Removed,
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "clean",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// Loose value equality used for property matching and change detection.
///
/// - `null` equals `null` (a missing property is `null`)
/// - numbers, numeric strings and booleans compare numerically
/// - strings compare textually, arrays and objects structurally
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Array(_), _)
        | (_, Value::Array(_))
        | (Value::Object(_), _)
        | (_, Value::Object(_)) => a == b,
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}
