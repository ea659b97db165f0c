//! Descriptor model for paramkit.
//!
//! Parameter classes, property catalogs, dialog groups and choice sets are
//! described here, validated into registries, and handed to
//! `paramkit-build` for emission.

pub mod binding;
pub mod error;
pub mod load;
pub mod node;
pub mod symbol;
pub mod types;
pub mod validate;

use crate::{
    binding::BindingError, error::ErrorTree, load::LoadError, node::ComposeError,
    symbol::SymbolError,
};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        binding::{BindingRegistry, ComboItem, ControlBinding, ProxyBinding},
        err,
        error::ErrorTree,
        node::*,
        symbol::SymbolTable,
        types::{Bound, DefaultValue, IntConstraint, Subpath, SymbolRef},
    };
    pub use paramkit_core::{ParamKind, Value};
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid descriptor '{unit}':\n{errors}")]
    Descriptor { unit: String, errors: ErrorTree },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}
