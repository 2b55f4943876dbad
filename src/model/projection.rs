use crate::bind::{Accessor, Bind, Synthesizer};
use crate::document::{DocumentView, Row};
use crate::error::{BindError, ConversionError};

use super::{Entity, EntityModel};

/// A tuple read positionally out of a [`Row`].
pub trait Projection: Sized + Send + 'static {
    type Accessors: Send + Sync + 'static;

    /// Number of positions read.
    const WIDTH: usize;

    fn bind(synth: &mut Synthesizer) -> Result<Self::Accessors, BindError>;

    fn read(accessors: &Self::Accessors, row: &dyn DocumentView) -> Result<Self, ConversionError>;
}

macro_rules! tuple_projection {
    ($width:expr; $($name:ident : $index:tt),+) => {
        impl<$($name: Bind),+> Projection for ($($name,)+) {
            type Accessors = ($(Accessor<$name>,)+);

            const WIDTH: usize = $width;

            fn bind(synth: &mut Synthesizer) -> Result<Self::Accessors, BindError> {
                Ok(($(synth.synthesize_at::<$name>($index)?,)+))
            }

            fn read(accessors: &Self::Accessors, row: &dyn DocumentView) -> Result<Self, ConversionError> {
                Ok(($(accessors.$index.read(row)?,)+))
            }
        }
    };
}

tuple_projection!(1; A: 0);
tuple_projection!(2; A: 0, B: 1);
tuple_projection!(3; A: 0, B: 1, C: 2);
tuple_projection!(4; A: 0, B: 1, C: 2, D: 3);
tuple_projection!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_projection!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// Reads selected properties of stored documents as a tuple.
///
/// The property names are resolved to field names when the projector is
/// built; reading only touches positions.
pub struct Projector<P: Projection> {
    fields: Vec<String>,
    accessors: P::Accessors,
}

impl<P: Projection> Projector<P> {
    pub fn new<E: Entity>(
        model: &EntityModel<E>,
        synth: &mut Synthesizer,
        properties: &[&str],
    ) -> Result<Self, BindError> {
        if properties.len() != P::WIDTH {
            return Err(BindError::ProjectionArity {
                expected: P::WIDTH,
                found: properties.len(),
            });
        }
        let fields = properties
            .iter()
            .map(|property| model.field_name(property).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fields,
            accessors: P::bind(synth)?,
        })
    }

    /// Stored field names, in tuple order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn read(&self, doc: &dyn DocumentView) -> Result<P, ConversionError> {
        P::read(&self.accessors, &Row::project(doc, &self.fields))
    }
}
