use crate::{
    Error,
    prelude::*,
    validate::naming::{is_identifier, validate_accessor_collisions, validate_name},
};
use paramkit_core::PropFlags;
use std::collections::BTreeSet;

///
/// PropertyType
///
/// Host property class plus the Rust type its default is built as.
/// `fallback` is the default expression used when a descriptor gives none.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertyType {
    pub tag: String,
    pub value_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl PropertyType {
    pub fn new(tag: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value_type: value_type.into(),
            fallback: None,
        }
    }
}

///
/// PropertyDescriptor
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub property_type: PropertyType,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    /// Replaces `property_type.tag` at registration, e.g. a constrained
    /// integer registered as a plain integer property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_flags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<IntConstraint>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            doc: String::new(),
            default: None,
            derived_type: None,
            prop_flags: None,
            constraint: None,
        }
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn derived(mut self, tag: impl Into<String>) -> Self {
        self.derived_type = Some(tag.into());
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.prop_flags = Some(flags.into());
        self
    }

    #[must_use]
    pub fn constrained(mut self, constraint: IntConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn type_tag(&self) -> &str {
        self.derived_type
            .as_deref()
            .unwrap_or(&self.property_type.tag)
    }
}

impl ValidateNode for PropertyDescriptor {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("property", &self.name, &mut errs);
        if self.type_tag().trim().is_empty() {
            err!(errs, "property type tag is empty");
        }
        if self.property_type.value_type.trim().is_empty() {
            err!(errs, "property value type is empty");
        }
        if let Some(DefaultValue::Symbol(s)) = &self.default
            && let Err(e) = s.check()
        {
            errs.add(e);
        }
        if let Some(c) = &self.constraint {
            for e in c.check() {
                errs.add(e);
            }
        }
        if let Some(flags) = &self.prop_flags
            && let Err(e) = PropFlags::parse(flags)
        {
            errs.add(e);
        }

        errs.result()
    }

    fn route_key(&self) -> String {
        self.name.clone()
    }
}

///
/// FeatureSpec
///
/// Ordered subset of a catalog registered on one host feature class.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub class_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    pub properties: Vec<String>,
}

impl FeatureSpec {
    pub fn new<I, S>(class_name: impl Into<String>, category: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_name: class_name.into(),
            category: category.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

///
/// PropertyCatalogSpec
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PropertyCatalogSpec {
    pub name: String,

    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyDescriptor>,

    #[serde(default, rename = "feature")]
    pub features: Vec<FeatureSpec>,
}

impl PropertyCatalogSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn property(mut self, p: PropertyDescriptor) -> Self {
        self.properties.push(p);
        self
    }

    #[must_use]
    pub fn feature(mut self, f: FeatureSpec) -> Self {
        self.features.push(f);
        self
    }
}

impl ValidateNode for PropertyCatalogSpec {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("catalog", &self.name, &mut errs);
        if self.properties.is_empty() {
            err!(errs, "catalog has no properties");
        }

        let mut names = BTreeSet::new();
        for p in &self.properties {
            if !names.insert(p.name.as_str()) {
                errs.add_at(p.route_key(), format!("duplicate property '{}'", p.name));
            }
            errs.merge_result(p.route_key(), p.validate());
        }
        validate_accessor_collisions(names.iter().copied(), &mut errs);

        let mut features = BTreeSet::new();
        for f in &self.features {
            let route = f.class_name.clone();
            if !is_identifier(&f.class_name) {
                errs.add_at(&route, format!("feature '{}' is not a valid identifier", f.class_name));
            }
            if !features.insert(f.class_name.as_str()) {
                errs.add_at(&route, format!("duplicate feature '{}'", f.class_name));
            }

            let mut seen = BTreeSet::new();
            for p in &f.properties {
                if !names.contains(p.as_str()) {
                    errs.add_at(&route, format!("unknown property '{p}'"));
                }
                if !seen.insert(p.as_str()) {
                    errs.add_at(&route, format!("property '{p}' listed twice"));
                }
            }
        }

        errs.result()
    }

    fn route_key(&self) -> String {
        self.name.clone()
    }
}

///
/// RegisteredProperty
///

#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredProperty {
    pub index: usize,
    pub descriptor: PropertyDescriptor,
    pub flags: PropFlags,
}

///
/// PropertyCatalog
///
/// Validated, stably indexed property set plus its feature subsets.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyCatalog {
    name: String,
    properties: Vec<RegisteredProperty>,
    features: Vec<FeatureSpec>,
}

impl PropertyCatalog {
    pub fn register(spec: PropertyCatalogSpec) -> Result<Self, Error> {
        spec.validate().map_err(|errors| Error::Descriptor {
            unit: spec.name.clone(),
            errors,
        })?;

        let properties = spec
            .properties
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| RegisteredProperty {
                index,
                flags: descriptor
                    .prop_flags
                    .as_deref()
                    .and_then(|f| PropFlags::parse(f).ok())
                    .unwrap_or_default(),
                descriptor,
            })
            .collect();

        Ok(Self {
            name: spec.name,
            properties,
            features: spec.features,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &[RegisteredProperty] {
        &self.properties
    }

    #[must_use]
    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RegisteredProperty> {
        self.properties.iter().find(|p| p.descriptor.name == name)
    }

    #[must_use]
    pub fn feature(&self, class_name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.class_name == class_name)
    }

    /// Properties of one feature in registration order.
    pub fn feature_properties<'a>(
        &'a self,
        feature: &'a FeatureSpec,
    ) -> impl Iterator<Item = &'a RegisteredProperty> + 'a {
        feature.properties.iter().filter_map(|n| self.lookup(n))
    }
}
