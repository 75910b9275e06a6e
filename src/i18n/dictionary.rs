//! Dictionary model: the nested key/value data held for one locale.
//!
//! A dictionary maps a key segment to an [`Entry`], which is either a string
//! template, a formatter function, or another dictionary. Dictionaries built
//! from JSON only ever contain templates and nested dictionaries; formatters
//! are registered from code.

use crate::i18n::path::Traverse;
use crate::i18n::template::Params;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced while converting raw data into a [`Dictionary`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("dictionary root must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("unsupported value at '{path}': {kind}")]
    UnsupportedValue { path: String, kind: &'static str },
}

/// A function producing final text from the call's parameters.
///
/// Formatters bypass template rendering entirely.
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(&Params) -> String + Send + Sync>);

impl Formatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, params: &Params) -> String {
        (self.0)(params)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

/// A single dictionary value.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A string template, possibly containing `{{ placeholders }}`.
    Text(String),
    /// A function of the parameters.
    Func(Formatter),
    /// A nested sub-dictionary.
    Nested(Dictionary),
}

impl Entry {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Entry::Nested(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PartialEq for Entry {
    /// Formatters compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Entry::Text(a), Entry::Text(b)) => a == b,
            (Entry::Nested(a), Entry::Nested(b)) => a == b,
            (Entry::Func(a), Entry::Func(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Entry::Text(text.to_string())
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Entry::Text(text)
    }
}

impl From<Dictionary> for Entry {
    fn from(dict: Dictionary) -> Self {
        Entry::Nested(dict)
    }
}

impl From<Formatter> for Entry {
    fn from(formatter: Formatter) -> Self {
        Entry::Func(formatter)
    }
}

impl Traverse for Entry {
    type Node = Entry;

    fn child(&self, segment: &str) -> Option<&Entry> {
        match self {
            Entry::Nested(dict) => dict.get(segment),
            _ => None,
        }
    }
}

/// Translation data for one locale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Dictionary {
    entries: BTreeMap<String, Entry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) {
        self.entries.insert(key.into(), entry.into());
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Deep-merge `other` into `self`.
    ///
    /// Nested dictionaries present on both sides are merged recursively; any
    /// other collision is resolved in favour of `other`.
    pub fn merge(&mut self, other: Dictionary) {
        for (key, incoming) in other.entries {
            match (self.entries.get_mut(&key), incoming) {
                (Some(Entry::Nested(existing)), Entry::Nested(nested)) => existing.merge(nested),
                (_, incoming) => {
                    self.entries.insert(key, incoming);
                }
            }
        }
    }

    /// Every leaf as a `(dot.path, entry)` pair, in key order.
    pub fn leaves(&self) -> Vec<(String, &Entry)> {
        let mut out = Vec::new();
        collect_leaves(self, "", &mut out);
        out
    }

    /// Build a dictionary from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, DictionaryError> {
        match value {
            Value::Object(map) => object_to_dictionary(map, ""),
            other => Err(DictionaryError::NotAnObject(json_kind(&other))),
        }
    }
}

impl TryFrom<Value> for Dictionary {
    type Error = DictionaryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Dictionary::from_json(value)
    }
}

impl Traverse for Dictionary {
    type Node = Entry;

    fn child(&self, segment: &str) -> Option<&Entry> {
        self.get(segment)
    }
}

impl<K: Into<String>, E: Into<Entry>> FromIterator<(K, E)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, entry) in iter {
            dict.insert(key, entry);
        }
        dict
    }
}

fn collect_leaves<'a>(dict: &'a Dictionary, prefix: &str, out: &mut Vec<(String, &'a Entry)>) {
    for (key, entry) in &dict.entries {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match entry {
            Entry::Nested(nested) => collect_leaves(nested, &path, out),
            leaf => out.push((path, leaf)),
        }
    }
}

fn object_to_dictionary(
    map: serde_json::Map<String, Value>,
    prefix: &str,
) -> Result<Dictionary, DictionaryError> {
    let mut dict = Dictionary::new();
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let entry = match value {
            Value::String(text) => Entry::Text(text),
            Value::Number(n) => Entry::Text(n.to_string()),
            Value::Bool(b) => Entry::Text(b.to_string()),
            Value::Object(nested) => Entry::Nested(object_to_dictionary(nested, &path)?),
            Value::Null => continue,
            Value::Array(_) => {
                return Err(DictionaryError::UnsupportedValue {
                    path,
                    kind: "array",
                })
            }
        };
        dict.entries.insert(key, entry);
    }
    Ok(dict)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
