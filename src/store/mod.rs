//! Document storage - untyped CRUD over named collections, plus the typed
//! [`Collection`] wrapper that goes through an [`EntityModel`](crate::EntityModel).

mod collection;
mod in_memory;

pub use collection::{Collection, CollectionsExt};
pub use in_memory::InMemoryDocumentStore;

use crate::document::{Document, Filter};
use crate::error::StoreError;

/// Data with its stored version.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Abstract CRUD storage for documents.
///
/// Filters address stored field names. Versions start at 1 and increase by one
/// on every replace.
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `DuplicateKey` if a document already
    /// matches `key`.
    fn insert(&self, collection: &str, key: &Filter, doc: Document) -> Result<u64, StoreError>;

    /// All documents matching `filter`, in insertion order.
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Versioned<Document>>, StoreError>;

    /// Replace the single document matching `filter`.
    ///
    /// With `expected_version` set, the replace only happens if the stored
    /// version matches.
    fn replace(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// Replace the document matching `key`, or insert `doc` if none does.
    /// Returns the new version.
    fn upsert(&self, collection: &str, key: &Filter, doc: Document) -> Result<u64, StoreError>;

    /// Delete every document matching `filter`. Returns how many were removed.
    fn delete(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError>;

    fn count(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError>;
}
