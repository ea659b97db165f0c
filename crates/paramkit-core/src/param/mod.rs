mod set;

#[cfg(test)]
mod tests;

pub use set::ParamSet;

use crate::{
    Constraints, ParamKind, PropFlags, Value,
    store::StorePath,
};
use derive_more::Display;
use std::borrow::Cow;

///
/// ParamInfo
///
/// One row of a class's parameter table. Generated definitions build these
/// with the `with_*` chain; interpreted hosts get them from the schema
/// registry.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ParamInfo {
    pub index: usize,
    pub name: Cow<'static, str>,
    pub kind: ParamKind,
    pub default: Value,
    pub doc: Cow<'static, str>,
    pub key: StorePath,
    pub notify: bool,
    pub gate: Option<Gate>,
    pub constraints: Option<Constraints>,
    pub flags: PropFlags,
}

impl ParamInfo {
    pub fn new(
        index: usize,
        name: impl Into<Cow<'static, str>>,
        kind: ParamKind,
        default: impl Into<Value>,
    ) -> Self {
        let name = name.into();

        Self {
            index,
            key: StorePath::new(name.as_ref()),
            name,
            kind,
            default: default.into(),
            doc: Cow::Borrowed(""),
            notify: false,
            gate: None,
            constraints: None,
            flags: PropFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<StorePath>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub const fn with_notify(mut self) -> Self {
        self.notify = true;
        self
    }

    /// Gate this parameter on a Bool companion; while the companion is
    /// false, reads return `sentinel`.
    #[must_use]
    pub fn with_gate(mut self, companion: usize, sentinel: impl Into<Value>) -> Self {
        self.gate = Some(Gate {
            companion,
            sentinel: sentinel.into(),
        });
        self
    }

    #[must_use]
    pub const fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: PropFlags) -> Self {
        self.flags = flags;
        self
    }
}

///
/// Gate
///

#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    pub companion: usize,
    pub sentinel: Value,
}

///
/// CacheState
///
/// Lifecycle of one cached slot. Opening walks
/// `Uninitialized -> DefaultSeeded -> StoreOverlaid -> Cached`; an external
/// store change goes `Cached -> Invalidated -> Cached`.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[repr(u8)]
pub enum CacheState {
    Uninitialized = 0,
    DefaultSeeded = 1,
    StoreOverlaid = 2,
    Cached = 3,
    Invalidated = 4,
}

impl CacheState {
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::DefaultSeeded,
            2 => Self::StoreOverlaid,
            3 => Self::Cached,
            4 => Self::Invalidated,
            _ => Self::Uninitialized,
        }
    }
}

///
/// ChangeEvent
///

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub index: usize,
    pub value: Value,
}

///
/// SubscriptionId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(pub u64);
