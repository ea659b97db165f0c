use crate::{
    Error, ParamSet,
    dialog::{ControlSpec, ControlValue, DialogSpec, UiToolkit},
};
use std::collections::BTreeMap;

///
/// DialogExtension
///
/// Host hook attached to a control by name. Called at construction, at
/// signal wiring and on every (re)translation, in that order.
///

pub trait DialogExtension<T: UiToolkit> {
    fn construct(&mut self, _toolkit: &mut T, _control: &ControlSpec, _handle: T::Handle) {}

    fn connect(&mut self, _toolkit: &mut T, _control: &ControlSpec, _handle: T::Handle) {}

    fn retranslate(&mut self, _toolkit: &mut T, _control: &ControlSpec, _handle: T::Handle) {}
}

///
/// ExtensionSet
///

pub struct ExtensionSet<T: UiToolkit> {
    extensions: BTreeMap<String, Box<dyn DialogExtension<T>>>,
}

impl<T: UiToolkit> ExtensionSet<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extensions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, ext: impl DialogExtension<T> + 'static) -> Self {
        self.insert(name, ext);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, ext: impl DialogExtension<T> + 'static) {
        self.extensions.insert(name.into(), Box::new(ext));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn DialogExtension<T>>> {
        self.extensions.get_mut(name)
    }
}

impl<T: UiToolkit> Default for ExtensionSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// ParamSources
/// parameter sets a dialog reads and writes, keyed by class name
///

#[derive(Clone, Debug, Default)]
pub struct ParamSources {
    sets: BTreeMap<String, ParamSet>,
}

impl ParamSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, set: &ParamSet) -> Self {
        self.insert(set);
        self
    }

    pub fn insert(&mut self, set: &ParamSet) {
        self.sets.insert(set.class().to_string(), set.clone());
    }

    pub fn get(&self, class: &str) -> Result<&ParamSet, Error> {
        self.sets
            .get(class)
            .ok_or_else(|| Error::UnknownClass(class.to_string()))
    }
}

///
/// Dialog
///
/// Live dialog over a toolkit. A control with a companion toggle is enabled
/// exactly while the toggle is checked; the store is only written by `save`.
///

pub struct Dialog<T: UiToolkit> {
    spec: DialogSpec,
    toolkit: T,
    handles: Vec<T::Handle>,
    enabled: Vec<bool>,
    dependents: BTreeMap<usize, Vec<usize>>,
    extensions: ExtensionSet<T>,
}

impl<T: UiToolkit> Dialog<T> {
    pub fn build(spec: DialogSpec, mut toolkit: T, mut extensions: ExtensionSet<T>) -> Result<Self, Error> {
        let mut dependents: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

        for (i, control) in spec.controls.iter().enumerate() {
            if let Some(name) = &control.extension
                && !extensions.contains(name)
            {
                return Err(Error::UnknownExtension(name.clone()));
            }
            if let Some(companion) = &control.companion {
                let at = spec
                    .find(companion)
                    .ok_or_else(|| Error::UnknownControl(companion.clone()))?;
                dependents.entry(at).or_default().push(i);
            }
        }

        // construction
        let mut handles = Vec::with_capacity(spec.controls.len());
        for control in &spec.controls {
            let handle = toolkit.create(control);
            if let Some(ext) = control.extension.as_deref().and_then(|n| extensions.get_mut(n)) {
                ext.construct(&mut toolkit, control, handle);
            }
            handles.push(handle);
        }

        let mut dialog = Self {
            enabled: vec![true; spec.controls.len()],
            spec,
            toolkit,
            handles,
            dependents,
            extensions,
        };

        // signal wiring
        let companions: Vec<usize> = dialog.dependents.keys().copied().collect();
        for companion in companions {
            dialog.sync_dependents(companion);
        }
        for (i, control) in dialog.spec.controls.iter().enumerate() {
            if let Some(ext) = control
                .extension
                .as_deref()
                .and_then(|n| dialog.extensions.get_mut(n))
            {
                ext.connect(&mut dialog.toolkit, control, dialog.handles[i]);
            }
        }

        dialog.retranslate();

        Ok(dialog)
    }

    #[must_use]
    pub const fn spec(&self) -> &DialogSpec {
        &self.spec
    }

    #[must_use]
    pub const fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub const fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    #[must_use]
    pub fn handle(&self, id: &str) -> Option<T::Handle> {
        self.spec.find(id).map(|i| self.handles[i])
    }

    #[must_use]
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.spec.find(id).map(|i| self.enabled[i])
    }

    /// Feed a user edit into the dialog, as the toolkit's change signal would.
    pub fn control_changed(&mut self, id: &str, value: ControlValue) -> Result<(), Error> {
        let at = self
            .spec
            .find(id)
            .ok_or_else(|| Error::UnknownControl(id.to_string()))?;

        self.toolkit.set_value(self.handles[at], &value);
        self.sync_dependents(at);

        Ok(())
    }

    /// Controls from accessors. A value the control cannot show is logged
    /// and replaced by the parameter default; if the default cannot be
    /// shown either, the control keeps what it had.
    pub fn load(&mut self, sources: &ParamSources) -> Result<(), Error> {
        for (i, control) in self.spec.controls.iter().enumerate() {
            let set = sources.get(&control.class)?;
            let value = set.value(control.param)?;

            let shown = match control.transform.to_control(&value) {
                Some(shown) => Some(shown),
                None => {
                    tracing::warn!(
                        dialog = %self.spec.name,
                        control = %control.id,
                        %value,
                        "value cannot be shown, using default"
                    );
                    control.transform.to_control(&set.default_value(control.param)?)
                }
            };

            if let Some(shown) = shown {
                self.toolkit.set_value(self.handles[i], &shown);
            }
        }

        let companions: Vec<usize> = self.dependents.keys().copied().collect();
        for companion in companions {
            self.sync_dependents(companion);
        }

        Ok(())
    }

    /// Accessors from controls. Returns how many parameters changed.
    pub fn save(&self, sources: &ParamSources) -> Result<usize, Error> {
        let mut changed = 0;

        for (i, control) in self.spec.controls.iter().enumerate() {
            let Some(shown) = self.toolkit.value(self.handles[i]) else {
                continue;
            };
            let value = control
                .transform
                .from_control(control.kind, &shown)
                .ok_or_else(|| Error::ControlValue {
                    id: control.id.clone(),
                    value: format!("{shown:?}"),
                })?;

            if sources.get(&control.class)?.set(control.param, value)? {
                changed += 1;
            }
        }

        tracing::debug!(dialog = %self.spec.name, changed, "dialog saved");

        Ok(changed)
    }

    pub fn retranslate(&mut self) {
        for (i, control) in self.spec.controls.iter().enumerate() {
            let label = self.toolkit.translate(&control.label);
            let tooltip = self.toolkit.translate(&control.tooltip);
            self.toolkit.set_texts(self.handles[i], &label, &tooltip);

            if let Some(ext) = control
                .extension
                .as_deref()
                .and_then(|n| self.extensions.get_mut(n))
            {
                ext.retranslate(&mut self.toolkit, control, self.handles[i]);
            }
        }
    }

    fn sync_dependents(&mut self, companion: usize) {
        let Some(dependents) = self.dependents.get(&companion) else {
            return;
        };
        let on = matches!(
            self.toolkit.value(self.handles[companion]),
            Some(ControlValue::Checked(true))
        );

        for &d in dependents {
            self.enabled[d] = on;
            self.toolkit.set_enabled(self.handles[d], on);
        }
    }
}
