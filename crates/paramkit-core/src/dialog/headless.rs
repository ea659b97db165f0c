use crate::dialog::{ControlKind, ControlSpec, ControlValue, UiToolkit};
use std::collections::BTreeMap;

///
/// HeadlessControl
///

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessControl {
    pub id: String,
    pub kind: ControlKind,
    pub value: Option<ControlValue>,
    pub enabled: bool,
    pub label: String,
    pub tooltip: String,
    pub items: Vec<String>,
}

///
/// HeadlessToolkit
///
/// Widget-free toolkit that records what a dialog asks of it.
///

#[derive(Clone, Debug, Default)]
pub struct HeadlessToolkit {
    controls: Vec<HeadlessControl>,
    translations: BTreeMap<String, String>,
}

impl HeadlessToolkit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_translation(&mut self, source: impl Into<String>, text: impl Into<String>) {
        self.translations.insert(source.into(), text.into());
    }

    #[must_use]
    pub fn control(&self, handle: usize) -> Option<&HeadlessControl> {
        self.controls.get(handle)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HeadlessControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn controls(&self) -> &[HeadlessControl] {
        &self.controls
    }
}

impl UiToolkit for HeadlessToolkit {
    type Handle = usize;

    fn create(&mut self, spec: &ControlSpec) -> usize {
        self.controls.push(HeadlessControl {
            id: spec.id.clone(),
            kind: spec.control,
            value: None,
            enabled: true,
            label: String::new(),
            tooltip: String::new(),
            items: spec.items.clone(),
        });

        self.controls.len() - 1
    }

    fn set_value(&mut self, handle: usize, value: &ControlValue) {
        if let Some(c) = self.controls.get_mut(handle) {
            c.value = Some(value.clone());
        }
    }

    fn value(&self, handle: usize) -> Option<ControlValue> {
        self.controls.get(handle).and_then(|c| c.value.clone())
    }

    fn set_enabled(&mut self, handle: usize, enabled: bool) {
        if let Some(c) = self.controls.get_mut(handle) {
            c.enabled = enabled;
        }
    }

    fn set_texts(&mut self, handle: usize, label: &str, tooltip: &str) {
        if let Some(c) = self.controls.get_mut(handle) {
            c.label = label.to_string();
            c.tooltip = tooltip.to_string();
        }
    }

    fn translate(&self, text: &str) -> String {
        self.translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
