use crate::value::Value;
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// ParamKind
///
/// Value type of a parameter. `Hex` is a 32-bit unsigned value shown in
/// hexadecimal; `QString` is text owned by the UI toolkit's string type.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum ParamKind {
    Bool,
    Float,
    Hex,
    Int,
    QString,
    String,
    UInt,
}

impl ParamKind {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::Hex)
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::String | Self::QString)
    }

    #[must_use]
    pub const fn zero(self) -> Value {
        Value::zero(self)
    }

    /// Canonical form of `value` for this kind, or `None` if the value does
    /// not belong to it. Integers widen into floats; non-negative integers
    /// are accepted for the unsigned kinds.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn normalize(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Bool, Value::Bool(v)) => Some(Value::Bool(*v)),

            (Self::Int, Value::Int(v)) => Some(Value::Int(*v)),
            (Self::Int, Value::UInt(v)) => i64::try_from(*v).ok().map(Value::Int),

            (Self::UInt, Value::UInt(v)) => Some(Value::UInt(*v)),
            (Self::UInt, Value::Int(v)) => u64::try_from(*v).ok().map(Value::UInt),

            (Self::Hex, Value::UInt(v)) => (*v <= u64::from(u32::MAX)).then_some(Value::UInt(*v)),
            (Self::Hex, Value::Int(v)) => u32::try_from(*v).ok().map(|v| Value::UInt(v.into())),

            (Self::Float, Value::Float(v)) => Some(Value::Float(*v)),
            (Self::Float, Value::Int(v)) => Some(Value::Float(*v as f64)),

            (Self::String | Self::QString, Value::Text(v)) => Some(Value::Text(v.clone())),

            _ => None,
        }
    }

    /// Like `normalize`, but text is also decoded through the native form.
    /// Stores that only hold strings go through here.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<Value> {
        self.normalize(value).or_else(|| match value {
            Value::Text(text) if !self.is_text() => self.decode(text),
            _ => None,
        })
    }

    /// Native text form, as a text-only store would hold it.
    #[must_use]
    pub fn encode(self, value: &Value) -> String {
        match (self, value) {
            (Self::Hex, Value::UInt(v)) => format!("0x{v:08X}"),
            (Self::Float, Value::Float(v)) => format!("{v:?}"),
            (_, Value::Text(v)) => v.clone(),
            (_, other) => other.to_string(),
        }
    }

    #[must_use]
    pub fn decode(self, raw: &str) -> Option<Value> {
        let text = raw.trim();

        match self {
            Self::Bool => match text {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Int => text.parse().ok().map(Value::Int),
            Self::UInt => text.parse().ok().map(Value::UInt),
            Self::Hex => {
                let parsed = match text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => text.parse::<u32>().ok(),
                };

                parsed.map(|v| Value::UInt(v.into()))
            }
            Self::Float => text.parse().ok().map(Value::Float),
            Self::String | Self::QString => Some(Value::Text(raw.to_string())),
        }
    }
}
