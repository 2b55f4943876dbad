//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use super::{DocumentStore, Versioned};
use crate::document::{Document, Filter};
use crate::error::StoreError;

/// Internal stored representation of a document.
struct StoredDocument {
    doc: Document,
    version: u64,
}

type Collections = HashMap<String, Vec<StoredDocument>>;

/// In-memory document store, one insertion-ordered list per collection.
///
/// Clone-friendly via Arc; clones share storage.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<Collections>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Names of collections that have held at least one document.
    pub fn collections(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<_> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert(&self, collection: &str, key: &Filter, doc: Document) -> Result<u64, StoreError> {
        let mut storage = self.write()?;
        let docs = storage.entry(collection.to_string()).or_default();

        if docs.iter().any(|stored| key.matches(&stored.doc)) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
            });
        }

        docs.push(StoredDocument { doc, version: 1 });
        trace!(collection, key = %key, "inserted document");
        Ok(1)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Versioned<Document>>, StoreError> {
        let storage = self.read()?;
        let found: Vec<_> = storage
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|stored| filter.matches(&stored.doc))
            .map(|stored| Versioned {
                data: stored.doc.clone(),
                version: stored.version,
            })
            .collect();
        trace!(collection, filter = %filter, found = found.len(), "found documents");
        Ok(found)
    }

    fn replace(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut storage = self.write()?;
        let stored = storage
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|stored| filter.matches(&stored.doc)))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                filter: filter.to_string(),
            })?;

        if let Some(expected) = expected_version {
            if stored.version != expected {
                return Err(StoreError::ConcurrencyConflict {
                    collection: collection.to_string(),
                    expected,
                    actual: stored.version,
                });
            }
        }

        stored.doc = doc;
        stored.version += 1;
        trace!(collection, filter = %filter, version = stored.version, "replaced document");
        Ok(stored.version)
    }

    fn upsert(&self, collection: &str, key: &Filter, doc: Document) -> Result<u64, StoreError> {
        let mut storage = self.write()?;
        let docs = storage.entry(collection.to_string()).or_default();

        let version = match docs.iter_mut().find(|stored| key.matches(&stored.doc)) {
            Some(stored) => {
                stored.doc = doc;
                stored.version += 1;
                stored.version
            }
            None => {
                docs.push(StoredDocument { doc, version: 1 });
                1
            }
        };
        trace!(collection, key = %key, version, "upserted document");
        Ok(version)
    }

    fn delete(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        let mut storage = self.write()?;
        let Some(docs) = storage.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|stored| !filter.matches(&stored.doc));
        let removed = before - docs.len();
        trace!(collection, filter = %filter, removed, "deleted documents");
        Ok(removed)
    }

    fn count(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        let storage = self.read()?;
        Ok(storage
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|stored| filter.matches(&stored.doc)).count()))
    }
}
