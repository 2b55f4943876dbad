use std::fmt;

use super::{DocumentView, Value};

/// A document predicate over stored field names.
///
/// Filters speak in resolved field names, never property names; typed callers
/// build them through [`EntityModel`](crate::EntityModel) so renames apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field is present and equal to the value.
    Eq(String, Value),
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::All => other,
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            filter => Filter::And(vec![filter, other]),
        }
    }

    pub fn matches(&self, doc: &dyn DocumentView) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, expected) => doc.get_by_name(field) == Some(expected),
            Filter::And(filters) => filters.iter().all(|filter| filter.matches(doc)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("*"),
            Filter::Eq(field, value) => write!(f, "{} == {}", field, value),
            Filter::And(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{}", filter)?;
                }
                Ok(())
            }
        }
    }
}
