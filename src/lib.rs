//! Document to typed-object binding.
//!
//! Documents are ordered bags of JSON values. Entities are plain structs that
//! derive [`Entity`]. A [`Mapper`] turns an entity type into an
//! [`EntityModel`] once, synthesizing one accessor per property, and the
//! model is then used to read, write and filter documents.
//!
//! ```ignore
//! use sourced_mapping::{CollectionsExt, Entity, InMemoryDocumentStore, Mapper};
//!
//! #[derive(Entity)]
//! struct Person {
//!     #[entity(rename = "_id")]
//!     id: i32,
//!     #[entity(rename = "nm")]
//!     names: Vec<String>,
//! }
//!
//! let model = Mapper::new().build::<Person>()?;
//! let store = InMemoryDocumentStore::new();
//! store.collection(&model).insert(&Person { id: 1, names: vec!["x".into()] })?;
//! ```

extern crate self as sourced_mapping;

pub mod bind;
mod config;
pub mod document;
mod error;
pub mod model;
pub mod naming;
pub mod store;

pub use bind::{Accessor, Bind, BindKind, Bytes, FromSequence, SequenceCtor, Synthesizer, TypeShape};
pub use config::{ConfigError, MappingConfig};
pub use document::{Document, DocumentView, FieldKey, Filter, Row, Value};
pub use error::{BindError, ConversionError, ConversionErrorKind, MappingError, NameResolutionError, StoreError};
pub use model::{Binder, Entity, EntityModel, MappedProperty, Mapper, Projection, Projector};
pub use naming::{
    AttributeResolver, ConventionResolver, FieldNameResolver, NamingConvention, OverrideResolver, PropertyInfo,
};
pub use store::{Collection, CollectionsExt, DocumentStore, InMemoryDocumentStore, Versioned};

// Re-export the derive macro
pub use sourced_mapping_macros::Entity;
