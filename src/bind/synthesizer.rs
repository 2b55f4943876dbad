use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::shape::TypeShape;
use super::{Bind, BindKind, Reader};
use crate::document::{Document, DocumentView, FieldKey};
use crate::error::{BindError, ConversionError};
use crate::model::MappedProperty;

/// Builds accessors. Type analysis happens here, once per type; the readers it
/// hands out never look at types again.
///
/// Used single-threaded while models are built; the accessors it produces are
/// `Send + Sync` and can be shared freely afterwards.
#[derive(Default)]
pub struct Synthesizer {
    readers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    /// Types whose analysis has started but not finished.
    in_progress: HashSet<TypeId>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor for a mapped property, reading its resolved field name.
    pub fn synthesize<T: Bind>(&mut self, property: &MappedProperty) -> Result<Accessor<T>, BindError> {
        let accessor = self.accessor::<T>(FieldKey::name(property.field_name()))?;
        debug!(
            property = property.name(),
            field = property.field_name(),
            shape = %accessor.shape(),
            "synthesized accessor"
        );
        Ok(accessor)
    }

    /// Accessor for a positional field, as in projection rows.
    pub fn synthesize_at<T: Bind>(&mut self, index: usize) -> Result<Accessor<T>, BindError> {
        let accessor = self.accessor::<T>(FieldKey::Index(index))?;
        debug!(index, shape = %accessor.shape(), "synthesized positional accessor");
        Ok(accessor)
    }

    /// Accessor for an arbitrary field name, bypassing any model.
    pub fn synthesize_named<T: Bind>(&mut self, field: &str) -> Result<Accessor<T>, BindError> {
        self.accessor::<T>(FieldKey::name(field))
    }

    /// The cached shape of `T`, analysing it first if needed.
    pub fn shape<T: Bind>(&mut self) -> Result<Arc<TypeShape>, BindError> {
        Ok(self.reader::<T>()?.shape().clone())
    }

    /// Reader for `T`. Item types are resolved recursively, each at most once.
    pub fn reader<T: Bind>(&mut self) -> Result<Reader<T>, BindError> {
        let id = TypeId::of::<T>();
        if let Some(reader) = self
            .readers
            .get(&id)
            .and_then(|cached| cached.downcast_ref::<Reader<T>>())
        {
            return Ok(reader.clone());
        }

        if !self.in_progress.insert(id) {
            return Err(BindError::UnsupportedShape {
                type_name: type_name::<T>(),
                reason: "recursive container type",
            });
        }
        let planned = match T::kind() {
            BindKind::Scalar(decode) => Ok(Reader::scalar(type_name::<T>(), decode)),
            BindKind::Array(plan) | BindKind::Sequence(plan) | BindKind::Nullable(plan) => {
                plan.plan(self)
            }
        };
        self.in_progress.remove(&id);
        let reader = planned?;
        trace!(type_name = type_name::<T>(), shape = %reader.shape(), "resolved type shape");

        self.readers.insert(id, Box::new(reader.clone()));
        Ok(reader)
    }

    /// Number of types analysed so far.
    pub fn cached_types(&self) -> usize {
        self.readers.len()
    }

    fn accessor<T: Bind>(&mut self, key: FieldKey) -> Result<Accessor<T>, BindError> {
        Ok(Accessor {
            key,
            reader: self.reader::<T>()?,
        })
    }
}

/// Reads one field of a document as `T`.
pub struct Accessor<T> {
    key: FieldKey,
    reader: Reader<T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            reader: self.reader.clone(),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("key", &self.key)
            .field("shape", self.reader.shape())
            .finish()
    }
}

impl<T: Bind> Accessor<T> {
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    /// The stored field name, `None` for positional accessors.
    pub fn field_name(&self) -> Option<&str> {
        self.key.as_name()
    }

    pub fn shape(&self) -> &Arc<TypeShape> {
        self.reader.shape()
    }

    pub fn read(&self, doc: &dyn DocumentView) -> Result<T, ConversionError> {
        self.reader.fetch(doc, &self.key)
    }

    /// Store `value` under this accessor's field. Positional accessors only
    /// overwrite a position that already exists.
    pub fn write(&self, value: &T, doc: &mut Document) {
        match &self.key {
            FieldKey::Name(name) => {
                doc.insert(name.clone(), value.to_value());
            }
            FieldKey::Index(index) => {
                doc.set_at(*index, value.to_value());
            }
        }
    }
}
