use crate::{
    prelude::*,
    types::{Bound, IntConstraint, SymbolRef},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SymbolError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SymbolError {
    #[error("unresolved symbol '{0}'")]
    Unresolved(String),

    #[error("symbol '{symbol}' does not fit a {kind} parameter")]
    Incompatible { symbol: String, kind: ParamKind },

    #[error("constraint is missing '{0}'")]
    MissingBound(&'static str),
}

///
/// SymbolTable
///
/// Values for symbolic defaults and bounds, used when a class is
/// interpreted instead of compiled. Generated code never consults this;
/// it emits the symbol as written.
///

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    values: BTreeMap<String, Value>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Integer limits under both their Rust paths and C-style names.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut t = Self::new();

        t.define("i32::MAX", i32::MAX)
            .define("i32::MIN", i32::MIN)
            .define("i64::MAX", i64::MAX)
            .define("i64::MIN", i64::MIN)
            .define("u32::MAX", u32::MAX)
            .define("u64::MAX", u64::MAX)
            .define("INT_MAX", i32::MAX)
            .define("INT_MIN", i32::MIN)
            .define("UINT_MAX", u32::MAX);

        t
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn resolve(&self, symbol: &SymbolRef) -> Result<Value, SymbolError> {
        self.values
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| SymbolError::Unresolved(symbol.to_string()))
    }

    /// Resolve and normalize to `kind`.
    pub fn resolve_as(&self, symbol: &SymbolRef, kind: ParamKind) -> Result<Value, SymbolError> {
        let value = self.resolve(symbol)?;

        kind.normalize(&value)
            .ok_or_else(|| SymbolError::Incompatible {
                symbol: symbol.to_string(),
                kind,
            })
    }

    pub fn resolve_bound(&self, bound: &Bound) -> Result<i64, SymbolError> {
        match bound {
            Bound::Literal(v) => Ok(*v),
            Bound::Symbol(s) => self
                .resolve_as(s, ParamKind::Int)?
                .as_i64()
                .ok_or_else(|| SymbolError::Incompatible {
                    symbol: s.to_string(),
                    kind: ParamKind::Int,
                }),
        }
    }

    /// `[min, max, step]`.
    pub fn resolve_constraint(&self, c: &IntConstraint) -> Result<[i64; 3], SymbolError> {
        let get = |b: &Option<Bound>, label: &'static str| {
            b.as_ref()
                .ok_or(SymbolError::MissingBound(label))
                .and_then(|b| self.resolve_bound(b))
        };

        Ok([get(&c.min, "min")?, get(&c.max, "max")?, get(&c.step, "step")?])
    }
}
