//! Preference dialog runtime.
//!
//! Generated dialog artifacts carry a `DialogSpec`; `Dialog` drives it
//! through any `UiToolkit`, loading controls from parameter sets and saving
//! them back.

mod control;
mod headless;
mod runtime;
mod spec;


pub use control::{ControlKind, ControlValue, ValueTransform};
pub use headless::{HeadlessControl, HeadlessToolkit};
pub use runtime::{Dialog, DialogExtension, ExtensionSet, ParamSources};
pub use spec::{ControlSpec, DialogSpec, GroupSpec, SpinRange};

///
/// UiToolkit
///
/// Widget backend. Handles are cheap copies owned by the toolkit.
///

pub trait UiToolkit {
    type Handle: Copy;

    fn create(&mut self, spec: &ControlSpec) -> Self::Handle;

    fn set_value(&mut self, handle: Self::Handle, value: &ControlValue);

    fn value(&self, handle: Self::Handle) -> Option<ControlValue>;

    fn set_enabled(&mut self, handle: Self::Handle, enabled: bool);

    fn set_texts(&mut self, handle: Self::Handle, label: &str, tooltip: &str);

    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}
