//! Runtime half of paramkit.
//!
//! Generated accessor code links against this crate only. It provides the
//! scalar model, the store boundary, the cached accessor set, integer
//! constraints, choice tables, the property-host boundary and the dialog
//! runtime driven through a toolkit trait.

pub mod choice;
pub mod color;
pub mod constraint;
pub mod dialog;
pub mod error;
pub mod param;
pub mod property;
pub mod store;
pub mod value;

pub use choice::{Choice, ChoiceTable};
pub use color::Rgba;
pub use constraint::{ConstraintError, ConstraintPolicy, Constraints};
pub use dialog::{
    ControlKind, ControlSpec, ControlValue, Dialog, DialogExtension, DialogSpec, ExtensionSet,
    GroupSpec, HeadlessControl, HeadlessToolkit, ParamSources, SpinRange, UiToolkit,
    ValueTransform,
};
pub use error::Error;
pub use param::{CacheState, ChangeEvent, Gate, ParamInfo, ParamSet, SubscriptionId};
pub use property::{PropFlags, PropertyHost, PropertyMap, PropertySpec};
pub use store::{MemoryStore, ParamStore, StorePath, WatchCallback, WatchId};
pub use value::{ParamKind, ParamValue, Value};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        ChangeEvent, Error, ParamKind, ParamSet, ParamStore, ParamValue, StorePath, Value,
    };
}
