use crate::{
    prelude::*,
    validate::naming::{is_identifier, validate_name},
};
use convert_case::{Case, Casing};
use std::collections::BTreeSet;

///
/// ChoiceItem
///
/// `name` is the persisted token and may contain spaces ("As Is"); the
/// generated variant is its PascalCase form.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChoiceItem {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl ChoiceItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            doc: String::new(),
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn variant_name(&self) -> String {
        self.name.to_case(Case::Pascal)
    }
}

///
/// ChoiceSet
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChoiceSet {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(default, rename = "item")]
    pub items: Vec<ChoiceItem>,
}

impl ChoiceSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn item(mut self, item: ChoiceItem) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn items(mut self, items: impl IntoIterator<Item = ChoiceItem>) -> Self {
        self.items.extend(items);
        self
    }
}

impl ValidateNode for ChoiceSet {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("choice set", &self.name, &mut errs);
        if self.items.is_empty() {
            err!(errs, "choice set has no items");
        }

        let mut names = BTreeSet::new();
        let mut variants = BTreeSet::new();
        for item in &self.items {
            if item.name.trim().is_empty() {
                err!(errs, "choice name is empty");
                continue;
            }
            if !names.insert(item.name.as_str()) {
                errs.add_at(&item.name, format!("duplicate choice '{}'", item.name));
                continue;
            }

            let variant = item.variant_name();
            if !is_identifier(&variant) {
                errs.add_at(
                    &item.name,
                    format!("choice '{}' does not yield an identifier", item.name),
                );
            } else if !variants.insert(variant.clone()) {
                errs.add_at(&item.name, format!("variant '{variant}' generated twice"));
            }
        }

        errs.result()
    }

    fn route_key(&self) -> String {
        self.name.clone()
    }
}
