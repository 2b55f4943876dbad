//! User-defined container types opting into sequence reconstruction.

use sourced_mapping::bind::sequence_value;
use sourced_mapping::{Bind, BindKind, FromSequence, SequenceCtor, Value};

/// Items kept in ascending order, whatever order they were stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct Sorted<T>(Vec<T>);

impl<T: Ord> Sorted<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort();
        Sorted(items)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: Bind + Ord> FromSequence for Sorted<T> {
    type Item = T;

    fn constructors() -> Vec<SequenceCtor<T, Self>> {
        vec![SequenceCtor::custom("Sorted::new", Sorted::new)]
    }
}

impl<T: Bind + Ord> Bind for Sorted<T> {
    fn kind() -> BindKind<Self> {
        BindKind::reconstruct()
    }

    fn to_value(&self) -> Value {
        sequence_value(&self.0)
    }
}

/// An insertion-ordered bag, only buildable through `FromIterator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bag<T> {
    items: Vec<T>,
}

impl<T> Bag<T> {
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Bag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Bag {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Bind> Bind for Bag<T> {
    fn kind() -> BindKind<Self> {
        BindKind::sequence(vec![SequenceCtor::from_iterator()])
    }

    fn to_value(&self) -> Value {
        sequence_value(self.iter())
    }
}
