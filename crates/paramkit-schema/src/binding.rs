use crate::{
    node::{ClassRegistry, RegisteredParam},
    prelude::*,
};
use paramkit_core::{ControlKind, SpinRange, ValueTransform};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error as ThisError;

///
/// BindingError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum BindingError {
    #[error("{param}: combo box has no items")]
    EmptyCombo { param: String },

    #[error("{param}: combo value {value} appears more than once")]
    DuplicateComboValue { param: String, value: i64 },

    #[error("{param}: companion '{companion}' not found in class")]
    MissingCompanion { param: String, companion: String },

    #[error("{param}: companion '{companion}' is {kind}, expected Bool")]
    CompanionNotBool {
        param: String,
        companion: String,
        kind: ParamKind,
    },

    #[error("{param}: a parameter cannot be its own companion")]
    SelfCompanion { param: String },

    #[error("{param}: extension '{extension}' is not registered")]
    UnknownExtension { param: String, extension: String },

    #[error("{param}: {proxy} cannot bind a {kind} parameter")]
    IncompatibleKind {
        param: String,
        proxy: &'static str,
        kind: ParamKind,
    },

    #[error("{param}: invalid spin range ({reason})")]
    InvalidRange { param: String, reason: String },
}

///
/// ComboItem
///

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct ComboItem {
    /// Stored value; the item position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    pub label: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl ComboItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
            doc: String::new(),
        }
    }

    #[must_use]
    pub const fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

///
/// ProxyBinding
///
/// How a parameter is presented in a dialog. Closed set; `Plain` uses the
/// default control for the kind and may carry a host extension.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[remain::sorted]
pub enum ProxyBinding {
    Color {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        companion: Option<String>,
    },
    ComboBox {
        items: Vec<ComboItem>,
    },
    FilePicker {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<String>,

        #[serde(default)]
        directory: bool,
    },
    LinePattern,
    Plain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        companion: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
    },
    ShortcutEdit,
    SpinBox {
        min: f64,
        max: f64,

        #[serde(default = "default_step")]
        step: f64,

        #[serde(default)]
        decimals: u32,
    },
}

const fn default_step() -> f64 {
    1.0
}

impl ProxyBinding {
    pub fn combo<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ComboBox {
            items: labels.into_iter().map(ComboItem::new).collect(),
        }
    }

    #[must_use]
    pub const fn color() -> Self {
        Self::Color { companion: None }
    }

    pub fn color_with(companion: impl Into<String>) -> Self {
        Self::Color {
            companion: Some(companion.into()),
        }
    }

    #[must_use]
    pub const fn spin(min: f64, max: f64, step: f64, decimals: u32) -> Self {
        Self::SpinBox {
            min,
            max,
            step,
            decimals,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self::Plain {
            companion: None,
            extension: None,
        }
    }

    #[must_use]
    pub const fn proxy_name(&self) -> &'static str {
        match self {
            Self::Color { .. } => "color",
            Self::ComboBox { .. } => "combo_box",
            Self::FilePicker { .. } => "file_picker",
            Self::LinePattern => "line_pattern",
            Self::Plain { .. } => "plain",
            Self::ShortcutEdit => "shortcut_edit",
            Self::SpinBox { .. } => "spin_box",
        }
    }

    #[must_use]
    pub fn companion(&self) -> Option<&str> {
        match self {
            Self::Color { companion } | Self::Plain { companion, .. } => companion.as_deref(),
            _ => None,
        }
    }

    const fn accepts(&self, kind: ParamKind) -> bool {
        match self {
            Self::Color { .. } => matches!(kind, ParamKind::Hex | ParamKind::UInt),
            Self::ComboBox { .. } => matches!(kind, ParamKind::Int | ParamKind::UInt),
            Self::FilePicker { .. } | Self::ShortcutEdit => kind.is_text(),
            Self::LinePattern => kind.is_integer(),
            Self::Plain { .. } => true,
            Self::SpinBox { .. } => kind.is_integer() || matches!(kind, ParamKind::Float),
        }
    }
}

///
/// CompanionRef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompanionRef {
    pub name: String,
    pub index: usize,
}

///
/// ControlBinding
///
/// Resolved presentation of one parameter: control family, value
/// transform, optional companion gate and the widget details.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ControlBinding {
    pub control: ControlKind,
    pub transform: ValueTransform,
    pub companion: Option<CompanionRef>,
    pub sentinel: Value,
    pub items: Vec<ComboItem>,
    pub range: Option<SpinRange>,
    pub filter: Option<String>,
    pub directory: bool,
    pub extension: Option<String>,
}

impl ControlBinding {
    fn new(control: ControlKind, transform: ValueTransform, kind: ParamKind) -> Self {
        Self {
            control,
            transform,
            companion: None,
            sentinel: Value::zero(kind),
            items: Vec::new(),
            range: None,
            filter: None,
            directory: false,
            extension: None,
        }
    }
}

///
/// BindingRegistry
///
/// Resolves proxies to control bindings. Host dialog extensions must be
/// registered here by name before a `Plain` proxy may reference them.
///

#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    extensions: BTreeSet<String>,
}

impl BindingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_extension(&mut self, name: impl Into<String>) -> &mut Self {
        self.extensions.insert(name.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.register_extension(name);
        self
    }

    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    pub fn resolve(
        &self,
        class: &ClassRegistry,
        param: &RegisteredParam,
    ) -> Result<ControlBinding, BindingError> {
        let desc = &param.descriptor;
        let kind = desc.kind;
        let name = || desc.name.clone();

        let Some(proxy) = &desc.proxy else {
            return Ok(ControlBinding::new(
                ControlKind::for_kind(kind),
                ValueTransform::Identity,
                kind,
            ));
        };

        if !proxy.accepts(kind) {
            return Err(BindingError::IncompatibleKind {
                param: name(),
                proxy: proxy.proxy_name(),
                kind,
            });
        }

        let mut binding = match proxy {
            ProxyBinding::ComboBox { items } => {
                if items.is_empty() {
                    return Err(BindingError::EmptyCombo { param: name() });
                }

                let mut seen = HashSet::new();
                let mut values = Vec::with_capacity(items.len());
                let mut resolved = Vec::with_capacity(items.len());
                for (pos, item) in items.iter().enumerate() {
                    let value = item.value.unwrap_or_else(|| i64::try_from(pos).unwrap_or(i64::MAX));
                    if !seen.insert(value) {
                        return Err(BindingError::DuplicateComboValue {
                            param: name(),
                            value,
                        });
                    }
                    if kind == ParamKind::UInt && value < 0 {
                        return Err(BindingError::IncompatibleKind {
                            param: name(),
                            proxy: "combo_box item",
                            kind,
                        });
                    }
                    values.push(value);
                    resolved.push(ComboItem {
                        value: Some(value),
                        ..item.clone()
                    });
                }

                let mut b = ControlBinding::new(
                    ControlKind::ComboBox,
                    ValueTransform::ComboIndex(values),
                    kind,
                );
                b.items = resolved;
                b
            }

            ProxyBinding::SpinBox {
                min,
                max,
                step,
                decimals,
            } => {
                if !min.is_finite() || !max.is_finite() || !step.is_finite() {
                    return Err(BindingError::InvalidRange {
                        param: name(),
                        reason: "bounds must be finite".to_string(),
                    });
                }
                if min > max {
                    return Err(BindingError::InvalidRange {
                        param: name(),
                        reason: format!("min {min} > max {max}"),
                    });
                }
                if *step <= 0.0 {
                    return Err(BindingError::InvalidRange {
                        param: name(),
                        reason: format!("step {step} must be positive"),
                    });
                }

                let control = ControlKind::for_kind(kind);
                let mut b = ControlBinding::new(control, ValueTransform::Identity, kind);
                b.range = Some(SpinRange::new(*min, *max, *step, *decimals));
                b
            }

            ProxyBinding::Color { .. } => {
                ControlBinding::new(ControlKind::ColorButton, ValueTransform::PackedColor, kind)
            }

            ProxyBinding::FilePicker { filter, directory } => {
                let mut b =
                    ControlBinding::new(ControlKind::FileChooser, ValueTransform::FilePath, kind);
                b.filter.clone_from(filter);
                b.directory = *directory;
                b
            }

            ProxyBinding::LinePattern => {
                ControlBinding::new(ControlKind::LinePattern, ValueTransform::LinePattern, kind)
            }

            ProxyBinding::ShortcutEdit => {
                ControlBinding::new(ControlKind::ShortcutEdit, ValueTransform::Shortcut, kind)
            }

            ProxyBinding::Plain { extension, .. } => {
                let mut b =
                    ControlBinding::new(ControlKind::for_kind(kind), ValueTransform::Identity, kind);
                if let Some(ext) = extension {
                    if !self.has_extension(ext) {
                        return Err(BindingError::UnknownExtension {
                            param: name(),
                            extension: ext.clone(),
                        });
                    }
                    b.extension = Some(ext.clone());
                }
                b
            }
        };

        if let Some(companion) = proxy.companion() {
            if companion == desc.name {
                return Err(BindingError::SelfCompanion { param: name() });
            }

            let target = class
                .lookup(companion)
                .ok_or_else(|| BindingError::MissingCompanion {
                    param: name(),
                    companion: companion.to_string(),
                })?;
            if target.descriptor.kind != ParamKind::Bool {
                return Err(BindingError::CompanionNotBool {
                    param: name(),
                    companion: companion.to_string(),
                    kind: target.descriptor.kind,
                });
            }

            binding.companion = Some(CompanionRef {
                name: companion.to_string(),
                index: target.index,
            });
        }

        Ok(binding)
    }

    /// Resolve every parameter of a class, in index order.
    pub fn resolve_all(&self, class: &ClassRegistry) -> Result<Vec<ControlBinding>, BindingError> {
        class.params().iter().map(|p| self.resolve(class, p)).collect()
    }
}
