use std::fmt;

use thiserror::Error;

use crate::document::FieldKey;

/// A stored value could not be interpreted as the requested type.
///
/// Raised per field at materialization time. `path` locates the failing value
/// inside the document (`names[1]`, `#0`, `tags[2][0]`).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert `{path}`: {kind}")]
pub struct ConversionError {
    pub path: String,
    pub kind: ConversionErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionErrorKind {
    #[error("field is missing")]
    Missing,
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("expected {expected} elements, found {found}")]
    Length { expected: usize, found: usize },
    #[error("{0}")]
    Invalid(String),
}

impl ConversionError {
    pub fn new(kind: ConversionErrorKind) -> Self {
        Self {
            path: String::new(),
            kind,
        }
    }

    pub fn missing() -> Self {
        Self::new(ConversionErrorKind::Missing)
    }

    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::new(ConversionErrorKind::TypeMismatch { expected, found })
    }

    pub fn out_of_range(value: impl fmt::Display, target: &'static str) -> Self {
        Self::new(ConversionErrorKind::OutOfRange {
            value: value.to_string(),
            target,
        })
    }

    /// Prefix the error path with the field the value was read from.
    pub fn within(mut self, key: &FieldKey) -> Self {
        self.path = join_path(&key.to_string(), &self.path);
        self
    }

    /// Prefix the error path with a container element position.
    pub fn at_element(mut self, index: usize) -> Self {
        self.path = join_path(&format!("[{}]", index), &self.path);
        self
    }
}

fn join_path(prefix: &str, rest: &str) -> String {
    if rest.is_empty() {
        prefix.to_string()
    } else if rest.starts_with('[') {
        format!("{}{}", prefix, rest)
    } else {
        format!("{}.{}", prefix, rest)
    }
}

/// A field name resolver could not produce a usable document field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameResolutionError {
    #[error("property {collection}.{property} resolved to an empty field name")]
    Empty {
        collection: String,
        property: String,
    },
    #[error("property {collection}.{property} resolved to invalid field name `{field}`: {reason}")]
    Invalid {
        collection: String,
        property: String,
        field: String,
        reason: &'static str,
    },
}

/// Structural failure while building an entity model. Fatal to the build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error(transparent)]
    NameResolution(#[from] NameResolutionError),
    #[error("type {type_name} cannot be bound: {reason}")]
    UnsupportedShape {
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("properties {first} and {second} of {collection} both map to field `{field}`")]
    DuplicateField {
        collection: String,
        field: String,
        first: String,
        second: String,
    },
    #[error("{collection} has no property named {property}")]
    UnknownProperty {
        collection: String,
        property: String,
    },
    #[error("property {collection}.{property} was declared but never bound")]
    UnboundProperty {
        collection: String,
        property: String,
    },
    #[error("{collection} declares no key property")]
    MissingKey { collection: String },
    #[error("{collection} declares more than one key property ({first}, {second})")]
    MultipleKeys {
        collection: String,
        first: String,
        second: String,
    },
    #[error("projection reads {expected} fields but {found} were named")]
    ProjectionArity { expected: usize, found: usize },
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("duplicate key in {collection}")]
    DuplicateKey { collection: String },
    #[error("no document in {collection} matches {filter}")]
    NotFound { collection: String, filter: String },
    #[error("concurrency conflict in {collection} (expected version {expected}, actual {actual})")]
    ConcurrencyConflict {
        collection: String,
        expected: u64,
        actual: u64,
    },
    #[error("document storage error: {0}")]
    Storage(String),
}

/// Error returned by typed collection operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
