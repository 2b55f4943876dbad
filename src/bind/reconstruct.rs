//! Container reconstruction.
//!
//! Arrays come back through the array primitive, optionally followed by a
//! coercion (`Box<[T]>`, `[T; N]`). Sequence types are rebuilt by handing the
//! decoded items to one of the constructors the type declares; the choice is
//! made once, at synthesis time, by [`select_constructor`].

use std::any::type_name;
use std::marker::PhantomData;

use super::shape::{ConstructorKind, ConstructorRef, ContainerShape, TypeShape};
use super::{primitives, Bind, BindKind, Reader, Synthesizer};
use crate::document::Value;
use crate::error::{BindError, ConversionError};

/// A deferred recipe for reading a container type, resolved against the
/// synthesizer so item types are analysed exactly once.
pub trait ContainerPlan<T>: Send + Sync {
    fn plan(&self, synth: &mut Synthesizer) -> Result<Reader<T>, BindError>;
}

/// A constructor that builds `T` from a sequence of `U`.
pub struct SequenceCtor<U, T> {
    kind: ConstructorKind,
    name: &'static str,
    build: fn(Vec<U>) -> T,
}

impl<U, T> Clone for SequenceCtor<U, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U, T> Copy for SequenceCtor<U, T> {}

impl<U, T> SequenceCtor<U, T> {
    /// A named constructor function. Ranks ahead of the trait-derived ones.
    pub fn custom(name: &'static str, build: fn(Vec<U>) -> T) -> Self {
        Self {
            kind: ConstructorKind::Custom,
            name,
            build,
        }
    }

    pub fn kind(&self) -> ConstructorKind {
        self.kind
    }

    pub fn reference(&self) -> ConstructorRef {
        ConstructorRef {
            kind: self.kind,
            name: self.name,
        }
    }

    pub fn build(&self, items: Vec<U>) -> T {
        (self.build)(items)
    }
}

impl<U, T: From<Vec<U>>> SequenceCtor<U, T> {
    pub fn from_vec() -> Self {
        Self {
            kind: ConstructorKind::FromVec,
            name: "From<Vec<_>>",
            build: convert_items::<U, T>,
        }
    }
}

impl<U, T: FromIterator<U>> SequenceCtor<U, T> {
    pub fn from_iterator() -> Self {
        Self {
            kind: ConstructorKind::FromIterator,
            name: "FromIterator",
            build: collect_items::<U, T>,
        }
    }
}

fn convert_items<U, T: From<Vec<U>>>(items: Vec<U>) -> T {
    T::from(items)
}

fn collect_items<U, T: FromIterator<U>>(items: Vec<U>) -> T {
    items.into_iter().collect()
}

/// Pick the constructor used to rebuild a sequence: lowest [`ConstructorKind`]
/// first, declaration order among equals.
pub fn select_constructor<U, T>(candidates: &[SequenceCtor<U, T>]) -> Option<&SequenceCtor<U, T>> {
    candidates.iter().min_by_key(|ctor| ctor.kind)
}

/// Opt-in for user container types rebuilt from a sequence of one item type.
///
/// ```ignore
/// impl<T: Bind> FromSequence for Bag<T> {
///     type Item = T;
///     fn constructors() -> Vec<SequenceCtor<T, Self>> {
///         vec![SequenceCtor::custom("Bag::new", Bag::new)]
///     }
/// }
///
/// impl<T: Bind> Bind for Bag<T> {
///     fn kind() -> BindKind<Self> { BindKind::reconstruct() }
///     fn to_value(&self) -> Value { sequence_value(self.iter()) }
/// }
/// ```
pub trait FromSequence: Bind {
    type Item: Bind;

    fn constructors() -> Vec<SequenceCtor<Self::Item, Self>>;
}

/// Encode a sequence of bindable items as a stored array.
pub fn sequence_value<'a, U: Bind>(items: impl IntoIterator<Item = &'a U>) -> Value {
    Value::Array(items.into_iter().map(Bind::to_value).collect())
}

impl<T: Bind> BindKind<T> {
    pub fn scalar(decode: super::ScalarDecoder<T>) -> Self {
        BindKind::Scalar(decode)
    }

    /// Read as an array of `U`, then convert into `T`.
    pub fn array_of<U: Bind>(coerce: fn(Vec<U>) -> Result<T, ConversionError>) -> Self {
        BindKind::Array(Box::new(ArrayPlan {
            coerce,
            coerced: true,
        }))
    }

    /// Read as a sequence of `U` and rebuild through one of `constructors`.
    pub fn sequence<U: Bind>(constructors: Vec<SequenceCtor<U, T>>) -> Self {
        BindKind::Sequence(Box::new(SequencePlan { constructors }))
    }
}

impl<T: FromSequence> BindKind<T> {
    pub fn reconstruct() -> Self {
        BindKind::sequence(T::constructors())
    }
}

impl<U: Bind> BindKind<Vec<U>> {
    pub fn array() -> Self {
        BindKind::Array(Box::new(ArrayPlan {
            coerce: Ok::<Vec<U>, ConversionError>,
            coerced: false,
        }))
    }
}

impl<U: Bind> BindKind<Option<U>> {
    pub fn nullable() -> Self {
        BindKind::Nullable(Box::new(NullablePlan(PhantomData)))
    }
}

struct ArrayPlan<U, T> {
    coerce: fn(Vec<U>) -> Result<T, ConversionError>,
    coerced: bool,
}

impl<U: Bind, T: 'static> ContainerPlan<T> for ArrayPlan<U, T> {
    fn plan(&self, synth: &mut Synthesizer) -> Result<Reader<T>, BindError> {
        let item = synth.reader::<U>()?;
        let shape = TypeShape {
            type_name: type_name::<T>(),
            nullable: false,
            coerced: self.coerced,
            container: ContainerShape::Array {
                item: item.shape().clone(),
            },
        };
        let coerce = self.coerce;
        let value_item = item.clone();

        Ok(Reader::new(
            shape,
            move |value| coerce(primitives::decode_array(value, &value_item)?),
            move |doc, key| {
                let items = primitives::get_array_of(doc, key, &item)?;
                coerce(items).map_err(|err| err.within(key))
            },
        ))
    }
}

struct SequencePlan<U, T> {
    constructors: Vec<SequenceCtor<U, T>>,
}

impl<U: Bind, T: 'static> ContainerPlan<T> for SequencePlan<U, T> {
    fn plan(&self, synth: &mut Synthesizer) -> Result<Reader<T>, BindError> {
        let ctor = *select_constructor(&self.constructors).ok_or(BindError::UnsupportedShape {
            type_name: type_name::<T>(),
            reason: "no constructor accepts a sequence of its items",
        })?;
        let item = synth.reader::<U>()?;
        let shape = TypeShape {
            type_name: type_name::<T>(),
            nullable: false,
            coerced: false,
            container: ContainerShape::Sequence {
                item: item.shape().clone(),
                constructor: ctor.reference(),
            },
        };
        let value_item = item.clone();

        Ok(Reader::new(
            shape,
            move |value| {
                let items = primitives::decode_enumerable(value, &value_item)?
                    .collect::<Result<Vec<U>, _>>()?;
                Ok(ctor.build(items))
            },
            move |doc, key| {
                let items = primitives::get_enumerable_of(doc, key, &item)?
                    .collect::<Result<Vec<U>, _>>()?;
                Ok(ctor.build(items))
            },
        ))
    }
}

struct NullablePlan<U>(PhantomData<fn() -> U>);

impl<U: Bind> ContainerPlan<Option<U>> for NullablePlan<U> {
    fn plan(&self, synth: &mut Synthesizer) -> Result<Reader<Option<U>>, BindError> {
        let inner = synth.reader::<U>()?;
        let mut shape = TypeShape::clone(inner.shape());
        shape.type_name = type_name::<Option<U>>();
        shape.nullable = true;
        shape.coerced = true;
        let value_inner = inner.clone();

        Ok(Reader::new(
            shape,
            move |value| match value {
                None | Some(Value::Null) => Ok(None),
                present => value_inner.decode(present).map(Some),
            },
            move |doc, key| match key.lookup(doc) {
                None | Some(Value::Null) => Ok(None),
                Some(_) => inner.fetch(doc, key).map(Some),
            },
        ))
    }
}
