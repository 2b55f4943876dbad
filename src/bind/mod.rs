//! Binding - turning stored values into typed Rust values.
//!
//! Every bindable type declares a [`BindKind`]: a scalar decoder, or a plan
//! for rebuilding it as a container of some item type. The [`Synthesizer`]
//! walks those declarations once per type and produces a [`Reader`]; an
//! [`Accessor`] pairs a reader with the field it reads.
//!
//! ```ignore
//! let mut synth = Synthesizer::new();
//! let names = synth.synthesize_named::<VecDeque<String>>("nm")?;
//! let deque = names.read(&document)?;
//! ```

mod container;
pub mod primitives;
mod reconstruct;
mod scalar;
mod shape;
mod synthesizer;

use std::sync::Arc;

use crate::document::{DocumentView, FieldKey, Value};
use crate::error::ConversionError;

pub use reconstruct::{sequence_value, select_constructor, ContainerPlan, FromSequence, SequenceCtor};
pub use scalar::Bytes;
pub use shape::{ConstructorKind, ConstructorRef, ContainerShape, TypeShape};
pub use synthesizer::{Accessor, Synthesizer};

/// Decodes one present, non-missing value.
pub type ScalarDecoder<T> = fn(&Value) -> Result<T, ConversionError>;

/// A type that can be read from and written to a document field.
pub trait Bind: Sized + Send + Sync + 'static {
    /// How this type is laid out in a document.
    fn kind() -> BindKind<Self>;

    /// Encode for storage.
    ///
    /// Encoding cannot fail. Values with no stored form (non-finite floats)
    /// are written as `null`, so reading them back only succeeds through
    /// `Option`.
    fn to_value(&self) -> Value;
}

/// Declared layout of a bindable type.
pub enum BindKind<T> {
    Scalar(ScalarDecoder<T>),
    Array(Box<dyn ContainerPlan<T>>),
    Sequence(Box<dyn ContainerPlan<T>>),
    Nullable(Box<dyn ContainerPlan<T>>),
}

type DecodeFn<T> = dyn Fn(Option<&Value>) -> Result<T, ConversionError> + Send + Sync;
type FetchFn<T> = dyn Fn(&dyn DocumentView, &FieldKey) -> Result<T, ConversionError> + Send + Sync;

/// Synthesized read routine for one type.
///
/// `decode` works on a bare value (used for container items), `fetch` reads a
/// field out of a document through the matching primitive.
pub struct Reader<T> {
    shape: Arc<TypeShape>,
    decode: Arc<DecodeFn<T>>,
    fetch: Arc<FetchFn<T>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            decode: Arc::clone(&self.decode),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T: 'static> Reader<T> {
    pub(crate) fn new(
        shape: TypeShape,
        decode: impl Fn(Option<&Value>) -> Result<T, ConversionError> + Send + Sync + 'static,
        fetch: impl Fn(&dyn DocumentView, &FieldKey) -> Result<T, ConversionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            shape: Arc::new(shape),
            decode: Arc::new(decode),
            fetch: Arc::new(fetch),
        }
    }

    pub(crate) fn scalar(type_name: &'static str, decode: ScalarDecoder<T>) -> Self {
        Self::new(
            TypeShape::scalar(type_name),
            move |value| primitives::decode_value(value, decode),
            move |doc, key| primitives::get_value_as(doc, key, decode),
        )
    }
}

impl<T> Reader<T> {
    pub fn shape(&self) -> &Arc<TypeShape> {
        &self.shape
    }

    pub fn decode(&self, value: Option<&Value>) -> Result<T, ConversionError> {
        (self.decode)(value)
    }

    pub fn fetch(&self, doc: &dyn DocumentView, key: &FieldKey) -> Result<T, ConversionError> {
        (self.fetch)(doc, key)
    }
}
