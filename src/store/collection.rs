//! Collection - typed access to one entity's documents.

use tracing::debug;

use super::{DocumentStore, Versioned};
use crate::bind::Bind;
use crate::document::{Document, Filter};
use crate::error::{ConversionError, MappingError};
use crate::model::{Entity, EntityModel, Projection, Projector};

/// Typed wrapper over a [`DocumentStore`] for entities of type `E`.
///
/// Every filter is built from the model, so renamed fields (the key included)
/// are used consistently for reads, writes and deletes.
pub struct Collection<'a, S, E: Entity> {
    store: &'a S,
    model: &'a EntityModel<E>,
}

impl<'a, S: DocumentStore, E: Entity> Collection<'a, S, E> {
    pub fn new(store: &'a S, model: &'a EntityModel<E>) -> Self {
        Self { store, model }
    }

    pub fn model(&self) -> &EntityModel<E> {
        self.model
    }

    /// Insert a new entity. Fails if its key is already stored.
    pub fn insert(&self, entity: &E) -> Result<u64, MappingError> {
        let doc = self.model.to_document(entity);
        Ok(self
            .store
            .insert(E::COLLECTION, &self.model.key_filter(entity), doc)?)
    }

    /// Get an entity by key.
    pub fn get<K: Bind>(&self, key: &K) -> Result<Option<Versioned<E>>, MappingError> {
        let mut found = self.find(&self.model.key_filter_for(key))?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// Entities whose stored documents match `filter`.
    pub fn find(&self, filter: &Filter) -> Result<Vec<Versioned<E>>, MappingError> {
        self.store
            .find(E::COLLECTION, filter)?
            .into_iter()
            .map(|found| {
                let version = found.version;
                self.materialize(&found.data)
                    .map(|data| Versioned { data, version })
            })
            .collect()
    }

    /// Entities whose `property` equals `value`.
    pub fn find_by<V: Bind>(&self, property: &str, value: &V) -> Result<Vec<Versioned<E>>, MappingError> {
        self.find(&self.model.filter_eq(property, value)?)
    }

    pub fn all(&self) -> Result<Vec<Versioned<E>>, MappingError> {
        self.find(&Filter::All)
    }

    /// Replace the stored entity with the same key.
    pub fn update(&self, entity: &E) -> Result<u64, MappingError> {
        self.replace(entity, None)
    }

    /// Replace the stored entity only if it is still at `expected_version`.
    pub fn update_versioned(&self, entity: &E, expected_version: u64) -> Result<u64, MappingError> {
        self.replace(entity, Some(expected_version))
    }

    /// Insert or replace, no version check.
    pub fn upsert(&self, entity: &E) -> Result<u64, MappingError> {
        let doc = self.model.to_document(entity);
        Ok(self
            .store
            .upsert(E::COLLECTION, &self.model.key_filter(entity), doc)?)
    }

    /// Delete the stored entity with the same key. Returns true if it existed.
    pub fn delete(&self, entity: &E) -> Result<bool, MappingError> {
        Ok(self.store.delete(E::COLLECTION, &self.model.key_filter(entity))? > 0)
    }

    pub fn delete_by_key<K: Bind>(&self, key: &K) -> Result<bool, MappingError> {
        Ok(self
            .store
            .delete(E::COLLECTION, &self.model.key_filter_for(key))?
            > 0)
    }

    pub fn count(&self, filter: &Filter) -> Result<usize, MappingError> {
        Ok(self.store.count(E::COLLECTION, filter)?)
    }

    /// Read selected properties of matching documents as tuples.
    pub fn project<P: Projection>(
        &self,
        projector: &Projector<P>,
        filter: &Filter,
    ) -> Result<Vec<P>, MappingError> {
        self.store
            .find(E::COLLECTION, filter)?
            .iter()
            .map(|found| {
                projector.read(&found.data).map_err(|err| {
                    debug!(collection = E::COLLECTION, error = %err, "failed to project document");
                    MappingError::from(err)
                })
            })
            .collect()
    }

    fn replace(&self, entity: &E, expected_version: Option<u64>) -> Result<u64, MappingError> {
        let doc = self.model.to_document(entity);
        Ok(self.store.replace(
            E::COLLECTION,
            &self.model.key_filter(entity),
            doc,
            expected_version,
        )?)
    }

    fn materialize(&self, doc: &Document) -> Result<E, MappingError> {
        self.model.from_document(doc).map_err(|err: ConversionError| {
            debug!(collection = E::COLLECTION, error = %err, "failed to materialize document");
            err.into()
        })
    }
}

/// Extension trait for typed collection access on any DocumentStore.
pub trait CollectionsExt: DocumentStore + Sized {
    /// Get a typed collection for a built model.
    fn collection<'a, E: Entity>(&'a self, model: &'a EntityModel<E>) -> Collection<'a, Self, E> {
        Collection::new(self, model)
    }
}

impl<S: DocumentStore> CollectionsExt for S {}
