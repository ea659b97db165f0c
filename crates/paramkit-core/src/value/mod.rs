mod kind;


pub use kind::ParamKind;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Value
///
/// Scalar exchanged with the store and held by accessor slots.
/// `Hex` parameters are carried as `UInt`; `String` and `QString` as `Text`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Zero value for a kind; also the disabled sentinel of gated parameters.
    #[must_use]
    pub const fn zero(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Bool => Self::Bool(false),
            ParamKind::Int => Self::Int(0),
            ParamKind::UInt | ParamKind::Hex => Self::UInt(0),
            ParamKind::Float => Self::Float(0.0),
            ParamKind::String | ParamKind::QString => Self::Text(String::new()),
        }
    }

    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::UInt(_) => "UInt",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Equality used for change coalescing: floats compare bitwise so a NaN
    /// written twice is still "unchanged".
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$cast>::from(v))
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Text as String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

///
/// ParamValue
///
/// Native Rust type behind a typed accessor.
///

pub trait ParamValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl ParamValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ParamValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl ParamValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }

    fn into_value(self) -> Value {
        Value::UInt(self)
    }
}

// packed colors and other 32-bit hex values
impl ParamValue for u32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|v| Self::try_from(v).ok())
    }

    fn into_value(self) -> Value {
        Value::UInt(u64::from(self))
    }
}

impl ParamValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ParamValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(ToString::to_string)
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}
