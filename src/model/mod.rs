//! Models - typed entities mapped onto stored documents.
//!
//! An [`Entity`] declares its properties; a [`Mapper`] resolves every
//! property's field name once, synthesizes one accessor per property, and
//! freezes the result into an [`EntityModel`].
//!
//! ## Example
//!
//! ```ignore
//! use sourced_mapping::{Entity, Mapper};
//!
//! #[derive(Entity)]
//! #[entity(collection = "people")]
//! struct Person {
//!     #[entity(id, rename = "_id")]
//!     id: i32,
//!     #[entity(rename = "nm")]
//!     names: Vec<String>,
//! }
//!
//! let mut mapper = Mapper::new();
//! let model = mapper.build::<Person>()?;
//! assert_eq!(model.key_field(), "_id");
//! ```

mod projection;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::bind::{Accessor, Bind, Synthesizer, TypeShape};
use crate::config::MappingConfig;
use crate::document::{Document, DocumentView, Filter, Value};
use crate::error::{BindError, ConversionError};
use crate::naming::{validate_field, AttributeResolver, FieldNameResolver, PropertyInfo};

pub use projection::{Projection, Projector};

/// A struct stored as one document per instance.
///
/// Usually derived with `#[derive(Entity)]`.
pub trait Entity: Sized + Send + Sync + 'static {
    /// The collection this entity is stored in.
    const COLLECTION: &'static str;

    /// One accessor per property, produced by [`bind`](Entity::bind).
    type Accessors: Send + Sync + 'static;

    /// Declared properties, in declaration order.
    fn properties() -> Vec<PropertyInfo>;

    fn bind(binder: &mut Binder<'_>) -> Result<Self::Accessors, BindError>;

    fn materialize(accessors: &Self::Accessors, doc: &dyn DocumentView) -> Result<Self, ConversionError>;

    fn write(&self, accessors: &Self::Accessors, doc: &mut Document);

    /// The stored form of this instance's key.
    fn key_value(&self) -> Value;
}

/// A property with its field name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedProperty {
    info: PropertyInfo,
    field_name: String,
    index: usize,
    shape: Option<Arc<TypeShape>>,
}

impl MappedProperty {
    pub fn new(info: PropertyInfo, field_name: impl Into<String>, index: usize) -> Self {
        Self {
            info,
            field_name: field_name.into(),
            index,
            shape: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_key(&self) -> bool {
        self.info.is_key
    }

    /// Set once the property has been bound.
    pub fn shape(&self) -> Option<&Arc<TypeShape>> {
        self.shape.as_ref()
    }
}

/// Hands out accessors for an entity's properties during a model build.
pub struct Binder<'a> {
    collection: &'static str,
    synth: &'a mut Synthesizer,
    properties: &'a mut [MappedProperty],
}

impl Binder<'_> {
    pub fn bind<T: Bind>(&mut self, property: &str) -> Result<Accessor<T>, BindError> {
        let mapped = self
            .properties
            .iter_mut()
            .find(|mapped| mapped.name() == property)
            .ok_or_else(|| BindError::UnknownProperty {
                collection: self.collection.to_string(),
                property: property.to_string(),
            })?;
        let accessor = self.synth.synthesize::<T>(mapped)?;
        mapped.shape = Some(accessor.shape().clone());
        Ok(accessor)
    }
}

/// The frozen mapping of one entity type.
pub struct EntityModel<E: Entity> {
    properties: Vec<MappedProperty>,
    key: usize,
    accessors: E::Accessors,
}

impl<E: Entity> EntityModel<E> {
    /// Resolve names, synthesize accessors, and check the result is complete.
    pub fn build(synth: &mut Synthesizer, resolver: &dyn FieldNameResolver) -> Result<Self, BindError> {
        let collection = E::COLLECTION;
        let infos = E::properties();

        let mut key = None;
        for (index, info) in infos.iter().enumerate() {
            if !info.is_key {
                continue;
            }
            if let Some(first) = key {
                let first: &PropertyInfo = &infos[first];
                return Err(BindError::MultipleKeys {
                    collection: collection.to_string(),
                    first: first.name.to_string(),
                    second: info.name.to_string(),
                });
            }
            key = Some(index);
        }
        let key = key.ok_or_else(|| BindError::MissingKey {
            collection: collection.to_string(),
        })?;

        let mut properties = Vec::with_capacity(infos.len());
        let mut claimed: HashMap<String, &'static str> = HashMap::new();
        for (index, info) in infos.into_iter().enumerate() {
            let field = resolver.resolve(collection, &info)?;
            validate_field(collection, info.name, &field)?;
            if let Some(first) = claimed.insert(field.clone(), info.name) {
                return Err(BindError::DuplicateField {
                    collection: collection.to_string(),
                    field,
                    first: first.to_string(),
                    second: info.name.to_string(),
                });
            }
            properties.push(MappedProperty::new(info, field, index));
        }

        let accessors = E::bind(&mut Binder {
            collection,
            synth,
            properties: &mut properties,
        })?;

        if let Some(unbound) = properties.iter().find(|mapped| mapped.shape.is_none()) {
            return Err(BindError::UnboundProperty {
                collection: collection.to_string(),
                property: unbound.name().to_string(),
            });
        }

        info!(
            collection,
            properties = properties.len(),
            key = properties[key].field_name(),
            "built entity model"
        );

        Ok(Self {
            properties,
            key,
            accessors,
        })
    }

    pub fn collection(&self) -> &'static str {
        E::COLLECTION
    }

    pub fn properties(&self) -> &[MappedProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&MappedProperty> {
        self.properties.iter().find(|mapped| mapped.name() == name)
    }

    /// Stored field name of a property.
    pub fn field_name(&self, property: &str) -> Result<&str, BindError> {
        self.property(property)
            .map(MappedProperty::field_name)
            .ok_or_else(|| BindError::UnknownProperty {
                collection: E::COLLECTION.to_string(),
                property: property.to_string(),
            })
    }

    pub fn key_property(&self) -> &MappedProperty {
        &self.properties[self.key]
    }

    /// Stored field name of the key property.
    pub fn key_field(&self) -> &str {
        self.key_property().field_name()
    }

    pub fn to_document(&self, entity: &E) -> Document {
        let mut doc = Document::new();
        entity.write(&self.accessors, &mut doc);
        doc
    }

    pub fn from_document(&self, doc: &dyn DocumentView) -> Result<E, ConversionError> {
        E::materialize(&self.accessors, doc)
    }

    /// Matches the stored document of `entity`.
    pub fn key_filter(&self, entity: &E) -> Filter {
        Filter::eq(self.key_field(), entity.key_value())
    }

    /// Matches the stored document whose key equals `key`.
    pub fn key_filter_for<K: Bind>(&self, key: &K) -> Filter {
        Filter::eq(self.key_field(), key.to_value())
    }

    /// Equality on a property, translated to its stored field.
    pub fn filter_eq<V: Bind>(&self, property: &str, value: &V) -> Result<Filter, BindError> {
        Ok(Filter::eq(self.field_name(property)?, value.to_value()))
    }
}

impl<E: Entity> fmt::Debug for EntityModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("collection", &E::COLLECTION)
            .field("key", &self.key_field())
            .field("properties", &self.properties)
            .finish()
    }
}

/// Builds and caches entity models.
///
/// Building takes `&mut self`; the models it returns are immutable and can be
/// shared across threads.
pub struct Mapper {
    resolver: Box<dyn FieldNameResolver>,
    synth: Synthesizer,
    models: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// A mapper that honours declared renames and otherwise keeps property names.
    pub fn new() -> Self {
        Self::with_resolver(AttributeResolver)
    }

    pub fn with_resolver(resolver: impl FieldNameResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            synth: Synthesizer::new(),
            models: HashMap::new(),
        }
    }

    pub fn from_config(config: &MappingConfig) -> Self {
        Self::with_resolver(config.resolver())
    }

    /// The model for `E`, building it on first use.
    pub fn build<E: Entity>(&mut self) -> Result<Arc<EntityModel<E>>, BindError> {
        let id = TypeId::of::<E>();
        if let Some(model) = self
            .models
            .get(&id)
            .and_then(|cached| Arc::clone(cached).downcast::<EntityModel<E>>().ok())
        {
            return Ok(model);
        }

        let model = Arc::new(EntityModel::<E>::build(&mut self.synth, &*self.resolver)?);
        self.models.insert(id, model.clone());
        Ok(model)
    }

    /// A positional projector over `properties` of `E`.
    pub fn projector<E: Entity, P: Projection>(
        &mut self,
        model: &EntityModel<E>,
        properties: &[&str],
    ) -> Result<Projector<P>, BindError> {
        Projector::new(model, &mut self.synth, properties)
    }
}
