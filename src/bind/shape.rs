use std::fmt;
use std::sync::Arc;

/// Static classification of a bound type, computed once per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub type_name: &'static str,
    /// `Option` wrapper: missing or `null` reads as `None`.
    pub nullable: bool,
    /// The extracted value goes through a conversion into the target type
    /// (`Box<[T]>`, `[T; N]`, `Option<T>`).
    pub coerced: bool,
    pub container: ContainerShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerShape {
    Scalar,
    Array {
        item: Arc<TypeShape>,
    },
    Sequence {
        item: Arc<TypeShape>,
        constructor: ConstructorRef,
    },
}

/// Which sequence-accepting constructor rebuilds a container.
///
/// Variant order is the selection priority: when a type offers several
/// candidates the lowest kind wins, then declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstructorKind {
    Custom,
    FromVec,
    FromIterator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorRef {
    pub kind: ConstructorKind,
    pub name: &'static str,
}

impl TypeShape {
    pub(crate) fn scalar(type_name: &'static str) -> Self {
        Self {
            type_name,
            nullable: false,
            coerced: false,
            container: ContainerShape::Scalar,
        }
    }

    /// The item shape for containers, `None` for scalars.
    pub fn item(&self) -> Option<&Arc<TypeShape>> {
        match &self.container {
            ContainerShape::Scalar => None,
            ContainerShape::Array { item } | ContainerShape::Sequence { item, .. } => Some(item),
        }
    }

    /// Container nesting depth: 0 for scalars, 2 for `Vec<Vec<T>>`.
    pub fn depth(&self) -> usize {
        self.item().map_or(0, |item| item.depth() + 1)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.container, ContainerShape::Scalar)
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            f.write_str("nullable ")?;
        }
        match &self.container {
            ContainerShape::Scalar => write!(f, "scalar {}", self.type_name),
            ContainerShape::Array { item } => write!(f, "array of ({})", item),
            ContainerShape::Sequence { item, constructor } => write!(
                f,
                "{} via {} of ({})",
                self.type_name, constructor.name, item
            ),
        }
    }
}
