//! ## Crate layout
//! - `build`: descriptor-to-Rust code generation, used from build scripts.
//! - `core`: runtime accessor sets, stores, constraints and the dialog runtime.
//! - `schema`: descriptor model, registries, bindings and validation.
//!
//! Generated code reaches the runtime through the root re-exports
//! (`::paramkit::ParamSet`, `::paramkit::Value`, ...), so a crate that
//! includes generated accessors only depends on `paramkit`.

pub use paramkit_build as build;
pub use paramkit_core as core;
pub use paramkit_schema as schema;

pub use paramkit_core::*;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use paramkit_build::build;

/// Include the accessors generated by `build!` in a build script.
#[macro_export]
macro_rules! include_params {
    () => {
        include!(concat!(env!("OUT_DIR"), "/paramkit.rs"));
    };
    ($file:literal) => {
        include!(concat!(env!("OUT_DIR"), "/", $file));
    };
}

///
/// Prelude
/// what code using generated accessors needs in scope
///

pub mod prelude {
    pub use crate::core::{
        ChangeEvent, ChoiceTable, Error, MemoryStore, ParamKind, ParamSet, ParamSources,
        ParamStore, ParamValue as _, StorePath, SubscriptionId, Value,
    };
    pub use std::sync::Arc;
}

///
/// Design Prelude
/// For descriptor authoring and interpreted hosts.
///

pub mod design {
    pub mod prelude {
        pub use crate::schema::{
            binding::{BindingRegistry, ProxyBinding},
            load::{self, DescriptorFile},
            node::{
                ChoiceItem, ChoiceSet, ClassRegistry, ClassSpec, DialogComposer,
                DialogDescriptor, DialogGroup, ParameterDescriptor, PropertyCatalog,
                PropertyCatalogSpec,
            },
            symbol::SymbolTable,
            types::{DefaultValue, IntConstraint, SymbolRef},
        };
        pub use crate::build::{Generator, GeneratorConfig};
    }
}
