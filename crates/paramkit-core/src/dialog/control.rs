use crate::{ParamKind, Rgba, Value};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

///
/// ControlKind
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum ControlKind {
    CheckBox,
    ColorButton,
    ComboBox,
    DoubleSpinBox,
    FileChooser,
    LineEdit,
    LinePattern,
    ShortcutEdit,
    SpinBox,
    UIntSpinBox,
}

impl ControlKind {
    /// Control used when a parameter has no explicit binding.
    #[must_use]
    pub const fn for_kind(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Bool => Self::CheckBox,
            ParamKind::Int => Self::SpinBox,
            ParamKind::UInt | ParamKind::Hex => Self::UIntSpinBox,
            ParamKind::Float => Self::DoubleSpinBox,
            ParamKind::String | ParamKind::QString => Self::LineEdit,
        }
    }
}

///
/// ControlValue
/// what a widget shows
///

#[derive(Clone, Debug, PartialEq)]
pub enum ControlValue {
    Checked(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Index(usize),
    Color(Rgba),
    Text(String),
    Path(PathBuf),
    Shortcut(String),
    Pattern(i64),
}

///
/// ValueTransform
///
/// Mapping between a stored parameter value and its control value.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ValueTransform {
    Identity,

    /// combo position <-> stored integer, one entry per item
    ComboIndex(Vec<i64>),

    PackedColor,
    FilePath,
    Shortcut,
    LinePattern,
}

impl ValueTransform {
    #[must_use]
    pub fn to_control(&self, value: &Value) -> Option<ControlValue> {
        match (self, value) {
            (Self::Identity, Value::Bool(v)) => Some(ControlValue::Checked(*v)),
            (Self::Identity, Value::Int(v)) => Some(ControlValue::Int(*v)),
            (Self::Identity, Value::UInt(v)) => Some(ControlValue::UInt(*v)),
            (Self::Identity, Value::Float(v)) => Some(ControlValue::Float(*v)),
            (Self::Identity, Value::Text(v)) => Some(ControlValue::Text(v.clone())),

            (Self::ComboIndex(values), v) => {
                let stored = v.as_i64()?;
                values
                    .iter()
                    .position(|x| *x == stored)
                    .map(ControlValue::Index)
            }

            (Self::PackedColor, Value::UInt(v)) => {
                u32::try_from(*v).ok().map(|p| ControlValue::Color(Rgba::from_packed(p)))
            }
            (Self::FilePath, Value::Text(v)) => Some(ControlValue::Path(PathBuf::from(v))),
            (Self::Shortcut, Value::Text(v)) => Some(ControlValue::Shortcut(v.clone())),
            (Self::LinePattern, v) => v.as_i64().map(ControlValue::Pattern),

            _ => None,
        }
    }

    /// Stored value for a control value, normalized to `kind`.
    #[must_use]
    pub fn from_control(&self, kind: ParamKind, control: &ControlValue) -> Option<Value> {
        let raw = match (self, control) {
            (Self::Identity, ControlValue::Checked(v)) => Value::Bool(*v),
            (Self::Identity, ControlValue::Int(v)) => Value::Int(*v),
            (Self::Identity, ControlValue::UInt(v)) => Value::UInt(*v),
            (Self::Identity, ControlValue::Float(v)) => Value::Float(*v),
            (Self::Identity, ControlValue::Text(v)) => Value::Text(v.clone()),

            (Self::ComboIndex(values), ControlValue::Index(i)) => Value::Int(*values.get(*i)?),

            (Self::PackedColor, ControlValue::Color(c)) => Value::UInt(c.to_packed().into()),
            (Self::FilePath, ControlValue::Path(p)) => Value::Text(p.to_string_lossy().into_owned()),
            (Self::Shortcut, ControlValue::Shortcut(s)) => Value::Text(s.clone()),
            (Self::LinePattern, ControlValue::Pattern(p)) => Value::Int(*p),

            _ => return None,
        };

        kind.normalize(&raw)
    }
}
