//! # Value Formats
//!
//! Records hold raw values. What a user types and what a renderer shows are
//! strings, so each property can be given a [`ValueFormat`] that converts
//! between the two:
//!
//! - `parse(raw)` turns user input into the value stored in the record, or
//!   fails with [`InvalidValue`]
//! - `format(value)` turns a stored value into display text
//!
//! Properties without a registered format use [`DefaultFormat`]: values are
//! stored as given and displayed as their text, `null` as the empty string.
//!
//! A failed parse never writes to the record and never panics. Callers tell
//! the failure apart from a legitimately falsy value (`0`, `""`, `false`) by
//! matching on the `Err(InvalidValue)`.
//!
//! The registry also caches one compiled placeholder pattern per property name
//! for template substitution (see [`crate::item::DataItem::in_string`]).

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Number, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Marker for a value that could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid value")]
pub struct InvalidValue;

/// Conversion between raw user input, stored values and display text.
pub trait ValueFormat {
    fn parse(&self, raw: &Value) -> Result<Value, InvalidValue> {
        Ok(raw.clone())
    }

    fn format(&self, value: &Value) -> String {
        default_text(value)
    }
}

/// Pass-through format used for unregistered properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormat;

impl ValueFormat for DefaultFormat {}

fn default_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numbers written with optional thousands separators, e.g. `"2,000,000"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormat;

impl ValueFormat for NumberFormat {
    fn parse(&self, raw: &Value) -> Result<Value, InvalidValue> {
        match raw {
            Value::Null | Value::Bool(false) => Ok(Value::from(0)),
            Value::Number(_) => Ok(raw.clone()),
            Value::String(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != ',')
                    .collect();
                if cleaned.is_empty() {
                    return Ok(Value::from(0));
                }
                let parsed: f64 = cleaned.parse().map_err(|_| InvalidValue)?;
                number_value(parsed).ok_or(InvalidValue)
            }
            _ => Err(InvalidValue),
        }
    }

    /// Unparseable values are shown as their raw text.
    fn format(&self, value: &Value) -> String {
        match self.parse(value) {
            Ok(Value::Number(n)) => n.as_f64().map(group_thousands).unwrap_or_default(),
            _ => default_text(value),
        }
    }
}

fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

fn group_thousands(n: f64) -> String {
    let text = format!("{:.3}", n.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if n < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

/// Dates stored as epoch milliseconds and shown as `YYYY-MM-DD` (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormat;

impl ValueFormat for DateFormat {
    fn parse(&self, raw: &Value) -> Result<Value, InvalidValue> {
        match raw {
            Value::Null => Ok(Value::Null),
            Value::Number(_) => Ok(raw.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => to_datetime_text(s.trim())
                .map(|dt| Value::from(dt.timestamp_millis()))
                .ok_or(InvalidValue),
            _ => Err(InvalidValue),
        }
    }

    fn format(&self, value: &Value) -> String {
        to_datetime(value)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Like [`DateFormat`] with the time of day: `YYYY-MM-DD HH:MM:SS` (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeFormat;

impl ValueFormat for DateTimeFormat {
    fn parse(&self, raw: &Value) -> Result<Value, InvalidValue> {
        DateFormat.parse(raw)
    }

    fn format(&self, value: &Value) -> String {
        to_datetime(value)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => to_datetime_text(s.trim()),
        _ => None,
    }
}

fn to_datetime_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Per-property lookup of value formats.
#[derive(Default)]
pub struct FormatRegistry {
    formats: HashMap<String, Rc<dyn ValueFormat>>,
    placeholders: RefCell<HashMap<String, Regex>>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<&String> = self.formats.keys().collect();
        properties.sort();
        f.debug_struct("FormatRegistry")
            .field("properties", &properties)
            .finish()
    }
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, property: impl Into<String>, format: Rc<dyn ValueFormat>) {
        self.formats.insert(property.into(), format);
    }

    pub fn with(mut self, property: impl Into<String>, format: impl ValueFormat + 'static) -> Self {
        self.register(property, Rc::new(format));
        self
    }

    /// The format registered for `property`, or [`DefaultFormat`].
    pub fn lookup(&self, property: &str) -> &dyn ValueFormat {
        match self.formats.get(property) {
            Some(format) => format.as_ref(),
            None => &DefaultFormat,
        }
    }

    pub fn parser(&self, property: &str) -> impl Fn(&Value) -> Result<Value, InvalidValue> + '_ {
        let format = self.lookup(property);
        move |raw| format.parse(raw)
    }

    pub fn formatter(&self, property: &str) -> impl Fn(&Value) -> String + '_ {
        let format = self.lookup(property);
        move |value| format.format(value)
    }

    /// Pattern matching `{property}`, compiled on first use.
    pub fn placeholder(&self, property: &str) -> Regex {
        let mut cache = self.placeholders.borrow_mut();
        if let Some(pattern) = cache.get(property) {
            return pattern.clone();
        }
        let pattern = Regex::new(&format!(r"\{{{}\}}", regex::escape(property)))
            .expect("escaped placeholder is a valid pattern");
        cache.insert(property.to_string(), pattern.clone());
        pattern
    }

    #[cfg(test)]
    fn cached_placeholders(&self) -> usize {
        self.placeholders.borrow().len()
    }
}
