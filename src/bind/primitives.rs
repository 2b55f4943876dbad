//! Document-to-value primitives.
//!
//! Each primitive exists in a field flavour (`get_*`, taking a document and a
//! [`FieldKey`]) and a value flavour (`decode_*`, taking a bare value) so that
//! container items can reuse the same rules. Name-or-index dispatch is the
//! [`FieldKey::lookup`] match; nothing here inspects types at runtime.

use std::iter::Enumerate;
use std::slice;

use super::{Reader, ScalarDecoder};
use crate::document::{value_kind, DocumentView, FieldKey, Value};
use crate::error::ConversionError;

/// Read a scalar field.
pub fn get_value_as<T>(
    doc: &dyn DocumentView,
    key: &FieldKey,
    decode: ScalarDecoder<T>,
) -> Result<T, ConversionError> {
    decode_value(key.lookup(doc), decode).map_err(|err| err.within(key))
}

/// Read an array field, decoding every element with `item`.
pub fn get_array_of<T>(
    doc: &dyn DocumentView,
    key: &FieldKey,
    item: &Reader<T>,
) -> Result<Vec<T>, ConversionError> {
    decode_array(key.lookup(doc), item).map_err(|err| err.within(key))
}

/// Read an array field lazily; elements are decoded as the iterator advances.
pub fn get_enumerable_of<'a, T>(
    doc: &'a dyn DocumentView,
    key: &'a FieldKey,
    item: &'a Reader<T>,
) -> Result<Enumerable<'a, T>, ConversionError> {
    let items = elements(key.lookup(doc)).map_err(|err| err.within(key))?;
    Ok(Enumerable {
        items: items.iter().enumerate(),
        item,
        key: Some(key),
    })
}

pub fn decode_value<T>(value: Option<&Value>, decode: ScalarDecoder<T>) -> Result<T, ConversionError> {
    decode(value.ok_or_else(ConversionError::missing)?)
}

pub fn decode_array<T>(value: Option<&Value>, item: &Reader<T>) -> Result<Vec<T>, ConversionError> {
    elements(value)?
        .iter()
        .enumerate()
        .map(|(index, element)| {
            item.decode(Some(element))
                .map_err(|err| err.at_element(index))
        })
        .collect()
}

pub fn decode_enumerable<'a, T>(
    value: Option<&'a Value>,
    item: &'a Reader<T>,
) -> Result<Enumerable<'a, T>, ConversionError> {
    Ok(Enumerable {
        items: elements(value)?.iter().enumerate(),
        item,
        key: None,
    })
}

fn elements(value: Option<&Value>) -> Result<&[Value], ConversionError> {
    match value {
        None => Err(ConversionError::missing()),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(ConversionError::mismatch("array", value_kind(other))),
    }
}

/// Lazily decoded sequence of items.
pub struct Enumerable<'a, T> {
    items: Enumerate<slice::Iter<'a, Value>>,
    item: &'a Reader<T>,
    key: Option<&'a FieldKey>,
}

impl<T> Iterator for Enumerable<'_, T> {
    type Item = Result<T, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, element) = self.items.next()?;
        Some(self.item.decode(Some(element)).map_err(|err| {
            let err = err.at_element(index);
            match self.key {
                Some(key) => err.within(key),
                None => err,
            }
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Enumerable<'_, T> {}
