//! Field naming - which stored field a property lives in.
//!
//! A resolver is asked once per property when a model is built. The answer is
//! stored on the [`MappedProperty`](crate::MappedProperty) and reused by every
//! read, write, filter and delete, key property included.

use std::any::type_name;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NameResolutionError;

/// Declared metadata for one property of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    /// The property's own name.
    pub name: &'static str,
    /// Field name override declared on the property.
    pub rename: Option<&'static str>,
    /// Whether this property is the entity's identity.
    pub is_key: bool,
    pub type_name: &'static str,
}

impl PropertyInfo {
    pub fn of<T>(name: &'static str) -> Self {
        Self {
            name,
            rename: None,
            is_key: false,
            type_name: type_name::<T>(),
        }
    }

    pub fn renamed(mut self, field: &'static str) -> Self {
        self.rename = Some(field);
        self
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }
}

/// Decides the stored field name for a property.
///
/// Implementations must be pure: the same property always yields the same name.
pub trait FieldNameResolver: Send + Sync {
    fn resolve(&self, collection: &str, property: &PropertyInfo) -> Result<String, NameResolutionError>;
}

/// Declared override if present, otherwise the property name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeResolver;

impl FieldNameResolver for AttributeResolver {
    fn resolve(&self, _collection: &str, property: &PropertyInfo) -> Result<String, NameResolutionError> {
        Ok(property.rename.unwrap_or(property.name).to_string())
    }
}

/// How undeclared field names are derived from property names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    #[default]
    AsDeclared,
    CamelCase,
    PascalCase,
    SnakeCase,
}

impl NamingConvention {
    pub fn apply(&self, name: &str) -> String {
        let trimmed = name.trim_start_matches('_');
        let prefix = &name[..name.len() - trimmed.len()];
        let words = split_words(trimmed);

        let body = match self {
            NamingConvention::AsDeclared => return name.to_string(),
            NamingConvention::SnakeCase => words
                .iter()
                .map(|word| word.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            NamingConvention::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    if i == 0 {
                        word.to_lowercase()
                    } else {
                        capitalize(word)
                    }
                })
                .collect(),
            NamingConvention::PascalCase => words.iter().map(|word| capitalize(word)).collect(),
        };
        format!("{}{}", prefix, body)
    }
}

fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Declared override if present, otherwise the property name in a convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionResolver {
    convention: NamingConvention,
}

impl ConventionResolver {
    pub fn new(convention: NamingConvention) -> Self {
        Self { convention }
    }
}

impl FieldNameResolver for ConventionResolver {
    fn resolve(&self, _collection: &str, property: &PropertyInfo) -> Result<String, NameResolutionError> {
        Ok(match property.rename {
            Some(field) => field.to_string(),
            None => self.convention.apply(property.name),
        })
    }
}

/// A `collection -> property -> field` table consulted before `inner`.
#[derive(Debug, Clone, Default)]
pub struct OverrideResolver<R> {
    overrides: BTreeMap<String, BTreeMap<String, String>>,
    inner: R,
}

impl<R: FieldNameResolver> OverrideResolver<R> {
    pub fn new(overrides: BTreeMap<String, BTreeMap<String, String>>, inner: R) -> Self {
        Self { overrides, inner }
    }

    pub fn with(mut self, collection: &str, property: &str, field: &str) -> Self {
        self.overrides
            .entry(collection.to_string())
            .or_default()
            .insert(property.to_string(), field.to_string());
        self
    }
}

impl<R: FieldNameResolver> FieldNameResolver for OverrideResolver<R> {
    fn resolve(&self, collection: &str, property: &PropertyInfo) -> Result<String, NameResolutionError> {
        match self
            .overrides
            .get(collection)
            .and_then(|fields| fields.get(property.name))
        {
            Some(field) => Ok(field.clone()),
            None => self.inner.resolve(collection, property),
        }
    }
}

impl<R: FieldNameResolver + ?Sized> FieldNameResolver for Box<R> {
    fn resolve(&self, collection: &str, property: &PropertyInfo) -> Result<String, NameResolutionError> {
        (**self).resolve(collection, property)
    }
}

/// Reject field names a document store cannot address.
pub fn validate_field(collection: &str, property: &str, field: &str) -> Result<(), NameResolutionError> {
    let invalid = |reason| NameResolutionError::Invalid {
        collection: collection.to_string(),
        property: property.to_string(),
        field: field.to_string(),
        reason,
    };

    if field.is_empty() {
        return Err(NameResolutionError::Empty {
            collection: collection.to_string(),
            property: property.to_string(),
        });
    }
    if field.starts_with('$') {
        return Err(invalid("field names cannot start with `$`"));
    }
    if field.contains('.') {
        return Err(invalid("field names cannot contain `.`"));
    }
    if field.contains('\0') {
        return Err(invalid("field names cannot contain NUL"));
    }
    Ok(())
}
