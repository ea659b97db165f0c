use crate::validate::naming::is_identifier;
use derive_more::Display;
use paramkit_core::Value;
use serde::{Deserialize, Serialize};

///
/// SymbolRef
///
/// Reference to a named constant in the generated code's scope, such as
/// `INT_MAX` or `i32::MAX`. Written in descriptor files as
/// `{ symbol = "i32::MAX" }`.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{symbol}")]
pub struct SymbolRef {
    symbol: String,
}

impl SymbolRef {
    /// Parse `ident(::ident)*`.
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let symbol = path.into();
        let sym = Self { symbol };
        sym.check()?;

        Ok(sym)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.symbol
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.symbol.split("::")
    }

    /// Deserialized references skip `new`, so descriptors re-check here.
    pub fn check(&self) -> Result<(), String> {
        let ok = !self.symbol.is_empty() && self.segments().all(is_identifier);
        if ok {
            Ok(())
        } else {
            Err(format!("malformed symbol '{}'", self.symbol))
        }
    }
}

///
/// DefaultValue
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Literal(Value),
    Symbol(SymbolRef),
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn symbol(path: impl Into<String>) -> Result<Self, String> {
        SymbolRef::new(path).map(Self::Symbol)
    }

    #[must_use]
    pub const fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Symbol(_) => None,
        }
    }
}

///
/// Bound
/// one end (or the step) of an integer constraint
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    Literal(i64),
    Symbol(SymbolRef),
}

impl Bound {
    #[must_use]
    pub const fn as_literal(&self) -> Option<i64> {
        match self {
            Self::Literal(v) => Some(*v),
            Self::Symbol(_) => None,
        }
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Self::Literal(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Self::Literal(v.into())
    }
}

impl From<SymbolRef> for Bound {
    fn from(s: SymbolRef) -> Self {
        Self::Symbol(s)
    }
}

///
/// IntConstraint
///
/// `(min, max, step)` of a constrained integer. All three must be present;
/// optional fields exist so descriptor files can report which one is
/// missing.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IntConstraint {
    #[serde(default)]
    pub min: Option<Bound>,

    #[serde(default)]
    pub max: Option<Bound>,

    #[serde(default)]
    pub step: Option<Bound>,
}

impl IntConstraint {
    pub fn new(min: impl Into<Bound>, max: impl Into<Bound>, step: impl Into<Bound>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
            step: Some(step.into()),
        }
    }

    /// Shape errors; symbolic bounds are checked at resolution.
    pub fn check(&self) -> Vec<String> {
        let mut errs = Vec::new();

        for (label, bound) in [("min", &self.min), ("max", &self.max), ("step", &self.step)] {
            match bound {
                None => errs.push(format!("constraint is missing '{label}'")),
                Some(Bound::Symbol(s)) => {
                    if let Err(e) = s.check() {
                        errs.push(e);
                    }
                }
                Some(Bound::Literal(_)) => {}
            }
        }

        let lit = |b: &Option<Bound>| b.as_ref().and_then(Bound::as_literal);
        if let (Some(min), Some(max)) = (lit(&self.min), lit(&self.max))
            && min > max
        {
            errs.push(format!("constraint min {min} exceeds max {max}"));
        }
        if let Some(step) = lit(&self.step)
            && step <= 0
        {
            errs.push(format!("constraint step {step} must be positive"));
        }

        errs
    }
}

///
/// Subpath
///
/// Store sub-section override. `group` replaces the class default
/// sub-section; `key` renames the leaf.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Subpath {
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_parse_as_paths() {
        assert!(SymbolRef::new("INT_MAX").is_ok());
        assert!(SymbolRef::new("i32::MAX").is_ok());
        assert!(SymbolRef::new("i32::").is_err());
        assert!(SymbolRef::new("1MAX").is_err());
        assert!(SymbolRef::new("a b").is_err());
        assert!(SymbolRef::new("").is_err());
    }

    #[test]
    fn default_value_untagged_forms() {
        let lit: DefaultValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(lit, DefaultValue::literal(1.5));

        let text: DefaultValue = serde_json::from_str("\"INT_MAX\"").unwrap();
        assert_eq!(text, DefaultValue::literal("INT_MAX"));

        let sym: DefaultValue = serde_json::from_str(r#"{"symbol":"INT_MAX"}"#).unwrap();
        assert_eq!(sym, DefaultValue::symbol("INT_MAX").unwrap());
    }

    #[test]
    fn constraint_shape_errors() {
        let missing = IntConstraint {
            min: Some(Bound::Literal(0)),
            ..IntConstraint::default()
        };
        assert_eq!(missing.check().len(), 2);

        assert_eq!(
            IntConstraint::new(5, 1, 1).check(),
            vec!["constraint min 5 exceeds max 1".to_string()]
        );
        assert_eq!(IntConstraint::new(0, 1, 0).check().len(), 1);

        let symbolic = IntConstraint::new(0, SymbolRef::new("INT_MAX").unwrap(), 1);
        assert!(symbolic.check().is_empty());
    }
}
