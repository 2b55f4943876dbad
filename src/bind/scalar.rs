//! Scalar bindings. Conversions are lossless or they fail.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::{Bind, BindKind};
use crate::document::{value_kind, Document, Value};
use crate::error::{ConversionError, ConversionErrorKind};

fn signed(value: &Value) -> Result<i64, ConversionError> {
    match value.as_i64() {
        Some(n) => Ok(n),
        None => match value.as_u64() {
            Some(n) => Err(ConversionError::out_of_range(n, "i64")),
            None => Err(ConversionError::mismatch("integer", value_kind(value))),
        },
    }
}

fn unsigned(value: &Value) -> Result<u64, ConversionError> {
    match value.as_u64() {
        Some(n) => Ok(n),
        None => match value.as_i64() {
            Some(n) => Err(ConversionError::out_of_range(n, "u64")),
            None => Err(ConversionError::mismatch("integer", value_kind(value))),
        },
    }
}

macro_rules! bind_integer {
    ($read:ident => $($ty:ty),* $(,)?) => {$(
        impl Bind for $ty {
            fn kind() -> BindKind<Self> {
                BindKind::scalar(|value| {
                    let n = $read(value)?;
                    <$ty>::try_from(n).map_err(|_| ConversionError::out_of_range(n, stringify!($ty)))
                })
            }

            fn to_value(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

bind_integer!(signed => i8, i16, i32, i64, isize);
bind_integer!(unsigned => u8, u16, u32, u64, usize);

/// Stored integers must be exactly representable as `f64`.
fn exact_f64(value: &Value) -> Result<f64, ConversionError> {
    if let Some(n) = value.as_i64() {
        let wide = n as f64;
        return if wide as i128 == i128::from(n) {
            Ok(wide)
        } else {
            Err(ConversionError::out_of_range(n, "f64"))
        };
    }
    if let Some(n) = value.as_u64() {
        let wide = n as f64;
        return if wide as u128 == u128::from(n) {
            Ok(wide)
        } else {
            Err(ConversionError::out_of_range(n, "f64"))
        };
    }
    value
        .as_f64()
        .ok_or_else(|| ConversionError::mismatch("number", value_kind(value)))
}

impl Bind for f64 {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(exact_f64)
    }

    /// NaN and infinities have no stored form and are written as `null`, which
    /// reads back as `None` through `Option<f64>` and fails for a bare `f64`.
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Bind for f32 {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            let wide = exact_f64(value)?;
            let narrow = wide as f32;
            if f64::from(narrow) == wide {
                Ok(narrow)
            } else {
                Err(ConversionError::out_of_range(wide, "f32"))
            }
        })
    }

    /// Non-finite values are written as `null`, as for `f64`.
    fn to_value(&self) -> Value {
        Value::from(f64::from(*self))
    }
}

impl Bind for bool {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            value
                .as_bool()
                .ok_or_else(|| ConversionError::mismatch("bool", value_kind(value)))
        })
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Bind for String {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ConversionError::mismatch("string", value_kind(value)))
        })
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Bind for char {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            let text = value
                .as_str()
                .ok_or_else(|| ConversionError::mismatch("string", value_kind(value)))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(ConversionError::new(ConversionErrorKind::Invalid(format!(
                    "expected a single character, found {:?}",
                    text
                )))),
            }
        })
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

/// The raw stored value, untouched.
impl Bind for Value {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| Ok(value.clone()))
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// A nested document kept as-is.
impl Bind for Document {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            Document::from_value(value)
                .ok_or_else(|| ConversionError::mismatch("document", value_kind(value)))
        })
    }

    fn to_value(&self) -> Value {
        self.clone().into_value()
    }
}

/// Binary payload, stored as a base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Bind for Bytes {
    fn kind() -> BindKind<Self> {
        BindKind::scalar(|value| {
            let text = value
                .as_str()
                .ok_or_else(|| ConversionError::mismatch("base64 string", value_kind(value)))?;
            STANDARD
                .decode(text)
                .map(Bytes)
                .map_err(|err| ConversionError::new(ConversionErrorKind::Invalid(err.to_string())))
        })
    }

    fn to_value(&self) -> Value {
        Value::String(STANDARD.encode(&self.0))
    }
}
