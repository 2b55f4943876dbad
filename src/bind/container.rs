use std::collections::{BTreeSet, BinaryHeap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use super::reconstruct::{sequence_value, SequenceCtor};
use super::{Bind, BindKind};
use crate::document::Value;
use crate::error::{ConversionError, ConversionErrorKind};

impl<U: Bind> Bind for Vec<U> {
    fn kind() -> BindKind<Self> {
        BindKind::array()
    }

    fn to_value(&self) -> Value {
        sequence_value(self)
    }
}

fn boxed_slice<U>(items: Vec<U>) -> Result<Box<[U]>, ConversionError> {
    Ok(items.into_boxed_slice())
}

impl<U: Bind> Bind for Box<[U]> {
    fn kind() -> BindKind<Self> {
        BindKind::array_of(boxed_slice::<U>)
    }

    fn to_value(&self) -> Value {
        sequence_value(self.iter())
    }
}

fn fixed_array<U, const N: usize>(items: Vec<U>) -> Result<[U; N], ConversionError> {
    let found = items.len();
    items.try_into().map_err(|_| {
        ConversionError::new(ConversionErrorKind::Length { expected: N, found })
    })
}

impl<U: Bind, const N: usize> Bind for [U; N] {
    fn kind() -> BindKind<Self> {
        BindKind::array_of(fixed_array::<U, N>)
    }

    fn to_value(&self) -> Value {
        sequence_value(self.iter())
    }
}

impl<U: Bind> Bind for VecDeque<U> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_iterator(), SequenceCtor::from_vec()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self)
    }
}

impl<U: Bind> Bind for LinkedList<U> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_iterator()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self)
    }
}

impl<U: Bind + Ord> Bind for BTreeSet<U> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_iterator()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self)
    }
}

/// Stored order follows the set's iteration order and is not stable.
impl<U: Bind + Eq + Hash> Bind for HashSet<U> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_iterator()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self)
    }
}

impl<U: Bind + Ord> Bind for BinaryHeap<U> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_vec(), SequenceCtor::from_iterator()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self.iter())
    }
}

impl<U: Bind> Bind for Option<U> {
    fn kind() -> BindKind<Self> {
        BindKind::nullable()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Bind::to_value)
    }
}
