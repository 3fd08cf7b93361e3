//! Tag value shapes.
//!
//! In JSON mode exiftool reports most tags as strings, numeric tags as
//! numbers, and repeatable tags (`Keywords`, `Subject`, ...) as arrays.
//! [`TagValue`] is the typed form of that output; converting is lossless for
//! the shapes the editor cares about.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single tag value as exiftool reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Number(serde_json::Number),
    List(Vec<String>),
}

impl TagValue {
    /// Convert a raw JSON value; `Null` means the tag is absent.
    pub(crate) fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(Self::Text(flag.to_string())),
            Value::Number(number) => Some(Self::Number(number)),
            Value::String(text) => Some(Self::Text(text)),
            Value::Array(items) => Some(Self::List(items.into_iter().map(stringify).collect())),
            object @ Value::Object(_) => Some(Self::Text(object.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        }
    }

    /// Flatten to a list of strings; scalars become one-element lists. This
    /// is how a single keyword (reported as a bare string) and a keyword list
    /// (reported as an array) collapse into one shape.
    pub fn into_strings(self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text],
            Self::Number(number) => vec![number.to_string()],
            Self::List(items) => items,
        }
    }

    /// True for the shapes exiftool uses to report "present but empty".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Number(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}
