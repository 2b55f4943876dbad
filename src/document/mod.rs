//! Documents - ordered, schema-flexible field bags and the read surface over them.
//!
//! A [`Document`] is what the store holds. Materialization only ever sees a
//! [`DocumentView`], which can be asked for a field by name or by position.

mod filter;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use filter::Filter;
pub use serde_json::Value;

/// Read-only projection over a document, addressable by name or position.
pub trait DocumentView {
    /// The value stored under `name`, if any.
    fn get_by_name(&self, name: &str) -> Option<&Value>;

    /// The value stored at declaration position `index`, if any.
    fn get_by_index(&self, index: usize) -> Option<&Value>;

    /// Number of addressable fields.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a field is located inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name(String),
    Index(usize),
}

impl FieldKey {
    pub fn name(name: impl Into<String>) -> Self {
        FieldKey::Name(name.into())
    }

    /// Fetch the raw value this key points at.
    pub fn lookup<'d>(&self, doc: &'d dyn DocumentView) -> Option<&'d Value> {
        match self {
            FieldKey::Name(name) => doc.get_by_name(name),
            FieldKey::Index(index) => doc.get_by_index(*index),
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(name) => Some(name),
            FieldKey::Index(_) => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// An ordered document: field order is insertion order and defines positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position if it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Replace the value at an existing position. Returns false if `index` is out of range.
    pub fn set_at(&mut self, index: usize, value: Value) -> bool {
        match self.fields.get_index_mut(index) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Convert into a JSON object, preserving field order where the map allows.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields.into_iter().collect())
    }

    /// Interpret a JSON object as a document. Returns `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|object| Self {
            fields: object
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        })
    }
}

impl DocumentView for Document {
    fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.fields.get_index(index).map(|(_, value)| value)
    }

    fn len(&self) -> usize {
        self.fields.len()
    }
}

impl DocumentView for serde_json::Map<String, Value> {
    fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values().nth(index)
    }

    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// A positional row: fields have no names, only positions.
///
/// Produced by projections; a `None` slot is a field the source document lacked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Option<Value>>,
}

impl Row {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self { values }
    }

    /// Pick `fields` out of `doc`, in order.
    pub fn project<S: AsRef<str>>(doc: &dyn DocumentView, fields: &[S]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| doc.get_by_name(field.as_ref()).cloned())
                .collect(),
        }
    }
}

impl DocumentView for Row {
    fn get_by_name(&self, _name: &str) -> Option<&Value> {
        None
    }

    fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Returns a short name for the kind of JSON value, used in conversion errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "document",
    }
}
