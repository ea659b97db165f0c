use crate::{
    binding::ProxyBinding,
    prelude::*,
    validate::{naming::validate_name, validate_store_segment},
};
use paramkit_core::PropFlags;

///
/// ParameterDescriptor
///
/// One user-tunable setting. `name` is the stable token behind the
/// generated accessor names and the store key.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParamKind,
    pub default: DefaultValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<Subpath>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub on_change: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_flags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<IntConstraint>,
}

#[expect(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, kind: ParamKind, default: DefaultValue) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
            title: None,
            doc: String::new(),
            subpath: None,
            on_change: false,
            proxy: None,
            prop_flags: None,
            constraint: None,
        }
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, ParamKind::Bool, DefaultValue::literal(default))
    }

    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, ParamKind::Int, DefaultValue::literal(default))
    }

    pub fn uint(name: impl Into<String>, default: u64) -> Self {
        Self::new(name, ParamKind::UInt, DefaultValue::literal(default))
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, ParamKind::Float, DefaultValue::literal(default))
    }

    pub fn string(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, ParamKind::String, DefaultValue::literal(default))
    }

    pub fn qstring(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, ParamKind::QString, DefaultValue::literal(default))
    }

    pub fn hex(name: impl Into<String>, default: u32) -> Self {
        Self::new(name, ParamKind::Hex, DefaultValue::literal(default))
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub const fn on_change(mut self) -> Self {
        self.on_change = true;
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: ProxyBinding) -> Self {
        self.proxy = Some(proxy);
        self
    }

    #[must_use]
    pub fn subpath(mut self, group: impl Into<String>) -> Self {
        self.subpath.get_or_insert_with(Subpath::default).group = Some(group.into());
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.subpath.get_or_insert_with(Subpath::default).key = Some(key.into());
        self
    }

    #[must_use]
    pub fn constrained(mut self, constraint: IntConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.prop_flags = Some(flags.into());
        self
    }

    /// Display title; the name when none is given.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Parsed flags. Validation guarantees this succeeds for registered
    /// descriptors.
    #[must_use]
    pub fn parsed_flags(&self) -> PropFlags {
        self.prop_flags
            .as_deref()
            .and_then(|f| PropFlags::parse(f).ok())
            .unwrap_or_default()
    }
}

impl ValidateNode for ParameterDescriptor {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("parameter", &self.name, &mut errs);

        match &self.default {
            DefaultValue::Literal(v) => {
                if self.kind.normalize(v).is_none() {
                    err!(errs, "default {v} is not a valid {}", self.kind);
                }
            }
            DefaultValue::Symbol(s) => {
                if let Err(e) = s.check() {
                    errs.add(e);
                }
            }
        }

        if let Some(c) = &self.constraint {
            if !self.kind.is_integer() {
                err!(errs, "integer constraint on {} parameter", self.kind);
            }
            for e in c.check() {
                errs.add(e);
            }

            // symbolic defaults and bounds are checked when the table opens
            if let Some(v) = self.default.as_literal().and_then(Value::as_i64) {
                let lit = |b: &Option<Bound>| b.as_ref().and_then(Bound::as_literal);
                if let Some(min) = lit(&c.min).filter(|min| v < *min) {
                    err!(errs, "default {v} is below constraint min {min}");
                }
                if let Some(max) = lit(&c.max).filter(|max| v > *max) {
                    err!(errs, "default {v} is above constraint max {max}");
                }
            }
        }

        if let Some(flags) = &self.prop_flags
            && let Err(e) = PropFlags::parse(flags)
        {
            errs.add(e);
        }

        if let Some(sub) = &self.subpath {
            if let Some(group) = &sub.group {
                validate_store_segment("subpath group", group, &mut errs);
            }
            if let Some(key) = &sub.key {
                validate_store_segment("subpath key", key, &mut errs);
                if key.contains('/') {
                    err!(errs, "subpath key '{key}' must be a single segment");
                }
            }
        }

        errs.result()
    }

    fn route_key(&self) -> String {
        self.name.clone()
    }
}
