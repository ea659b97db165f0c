use crate::{
    binding::{BindingError, BindingRegistry, ControlBinding},
    node::{ClassRegistry, RegisteredParam},
    prelude::*,
    validate::naming::{is_identifier, validate_name},
};
use paramkit_core::{ControlSpec, DialogSpec};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// ComposeError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ComposeError {
    #[error("invalid dialog descriptor:\n{0}")]
    Descriptor(ErrorTree),

    #[error("dialog references unknown class '{0}'")]
    UnknownClass(String),

    #[error("class name '{0}' is registered in more than one namespace; qualify it")]
    AmbiguousClass(String),

    #[error("class '{class}' has no parameter '{param}'")]
    UnknownParam { class: String, param: String },

    #[error("'{class}.{param}' appears more than once")]
    DuplicateEntry { class: String, param: String },

    #[error(transparent)]
    Binding(#[from] BindingError),
}

///
/// DialogEntry
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DialogEntry {
    pub class: String,
    pub param: String,
}

impl DialogEntry {
    pub fn new(class: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            param: param.into(),
        }
    }
}

///
/// DialogGroup
///
/// Named, titled bundle of parameter references. Exists only at
/// generation time.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DialogGroup {
    pub name: String,
    pub title: String,

    #[serde(default, rename = "entry")]
    pub entries: Vec<DialogEntry>,
}

impl DialogGroup {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            entries: Vec::new(),
        }
    }

    /// Add every listed parameter of one class, in order.
    #[must_use]
    pub fn entries<I, S>(mut self, class: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .extend(params.into_iter().map(|p| DialogEntry::new(class, p)));
        self
    }
}

///
/// DialogDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DialogDescriptor {
    #[serde(default)]
    pub namespace: String,

    pub class_name: String,
    pub title: String,

    #[serde(default, rename = "group")]
    pub groups: Vec<DialogGroup>,
}

impl DialogDescriptor {
    pub fn new(
        namespace: impl Into<String>,
        class_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
            title: title.into(),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn group(mut self, group: DialogGroup) -> Self {
        self.groups.push(group);
        self
    }
}

impl ValidateNode for DialogDescriptor {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("dialog", &self.class_name, &mut errs);
        if !self.namespace.is_empty() && !self.namespace.split("::").all(is_identifier) {
            err!(errs, "namespace '{}' is not a path of identifiers", self.namespace);
        }

        let mut names = BTreeSet::new();
        for g in &self.groups {
            if !names.insert(g.name.as_str()) {
                errs.add_at(&g.name, format!("duplicate group '{}'", g.name));
            }
            if g.entries.is_empty() {
                errs.add_at(&g.name, "group has no entries");
            }
        }

        errs.result()
    }

    fn route_key(&self) -> String {
        self.class_name.clone()
    }
}

///
/// LayoutControl
///

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutControl {
    pub id: String,
    pub class: String,
    pub param: usize,
    pub name: String,
    pub kind: ParamKind,
    pub label: String,
    pub tooltip: String,
    pub binding: ControlBinding,

    /// Id of the companion control gating this one.
    pub companion_id: Option<String>,
}

///
/// LayoutRow
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutRow {
    pub controls: Vec<LayoutControl>,
}

///
/// LayoutGroup
///

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutGroup {
    pub name: String,
    pub title: String,
    pub rows: Vec<LayoutRow>,
}

///
/// DialogLayout
///
/// Composed dialog: groups of rows of controls, in emission order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct DialogLayout {
    pub namespace: String,
    pub class_name: String,
    pub title: String,
    pub groups: Vec<LayoutGroup>,
}

impl DialogLayout {
    pub fn controls(&self) -> impl Iterator<Item = &LayoutControl> {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .flat_map(|r| r.controls.iter())
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&LayoutControl> {
        self.controls().find(|c| c.id == id)
    }

    /// Runtime dialog description, for interpreted hosts.
    #[must_use]
    pub fn to_spec(&self) -> DialogSpec {
        let mut spec = DialogSpec::new(self.class_name.as_str(), self.title.as_str());

        for (g, group) in self.groups.iter().enumerate() {
            spec = spec.group(group.name.as_str(), group.title.as_str());
            for (r, row) in group.rows.iter().enumerate() {
                for c in &row.controls {
                    spec = spec.control(control_spec(c).at(g, r));
                }
            }
        }

        spec
    }
}

fn control_spec(c: &LayoutControl) -> ControlSpec {
    let b = &c.binding;
    let mut spec = ControlSpec::new(
        c.id.as_str(),
        c.class.as_str(),
        c.param,
        c.name.as_str(),
        c.kind,
        b.control,
    )
    .with_transform(b.transform.clone())
    .with_texts(c.label.as_str(), c.tooltip.as_str())
    .with_items(b.items.iter().map(|i| i.label.clone()));

    if let Some(id) = &c.companion_id {
        spec = spec.with_companion(id.as_str());
    }
    if let Some(range) = b.range {
        spec = spec.with_range(range);
    }
    if let Some(filter) = &b.filter {
        spec = spec.with_filter(filter.as_str());
    }
    if let Some(ext) = &b.extension {
        spec = spec.with_extension(ext.as_str());
    }

    spec
}

///
/// DialogComposer
///
/// Lays out dialog groups against registered classes. Classes are looked up
/// by bare or qualified name.
///

#[derive(Debug)]
pub struct DialogComposer<'a> {
    classes: BTreeMap<String, &'a ClassRegistry>,
    ambiguous: BTreeSet<String>,
    bindings: &'a BindingRegistry,
}

impl<'a> DialogComposer<'a> {
    #[must_use]
    pub fn new(bindings: &'a BindingRegistry) -> Self {
        Self {
            classes: BTreeMap::new(),
            ambiguous: BTreeSet::new(),
            bindings,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: &'a ClassRegistry) -> Self {
        self.add_class(class);
        self
    }

    /// A bare name shared by classes from different namespaces stops
    /// resolving; those classes are reachable by qualified name only.
    pub fn add_class(&mut self, class: &'a ClassRegistry) {
        let qualified = class.qualified_name();
        let bare = class.class_name().to_string();

        match self.classes.get(&bare) {
            Some(other) if other.qualified_name() != qualified => {
                self.classes.remove(&bare);
                self.ambiguous.insert(bare.clone());
            }
            Some(_) => {}
            None if self.ambiguous.contains(&bare) => {}
            None => {
                self.classes.insert(bare.clone(), class);
            }
        }
        if qualified != bare {
            self.classes.insert(qualified, class);
        }
    }

    fn class(&self, name: &str) -> Result<&'a ClassRegistry, ComposeError> {
        if self.ambiguous.contains(name) {
            return Err(ComposeError::AmbiguousClass(name.to_string()));
        }

        self.classes
            .get(name)
            .copied()
            .ok_or_else(|| ComposeError::UnknownClass(name.to_string()))
    }

    /// One control per entry, group order then entry order. A dependent and
    /// its companion share a row with the companion first; a companion that
    /// is already placed is referenced, not repeated.
    pub fn compose(&self, desc: &DialogDescriptor) -> Result<DialogLayout, ComposeError> {
        desc.validate().map_err(ComposeError::Descriptor)?;

        let mut listed = BTreeSet::new();
        for entry in desc.groups.iter().flat_map(|g| g.entries.iter()) {
            let class = self.class(&entry.class)?;
            let param = lookup(class, &entry.param)?;
            if !listed.insert((class.qualified_name(), param.index)) {
                return Err(ComposeError::DuplicateEntry {
                    class: entry.class.clone(),
                    param: entry.param.clone(),
                });
            }
        }

        let mut placed = BTreeSet::new();
        let mut groups = Vec::with_capacity(desc.groups.len());

        for group in &desc.groups {
            let mut rows = Vec::new();

            for entry in &group.entries {
                let class = self.class(&entry.class)?;
                let param = lookup(class, &entry.param)?;
                if placed.contains(&control_id(class, param.name())) {
                    continue;
                }

                let binding = self.bindings.resolve(class, param)?;
                let mut row = LayoutRow::default();

                let companion_id = match &binding.companion {
                    Some(c) => {
                        let id = control_id(class, &c.name);
                        if placed.insert(id.clone()) {
                            let target = lookup(class, &c.name)?;
                            let b = self.bindings.resolve(class, target)?;
                            row.controls.push(layout_control(class, target, b, None));
                        }
                        Some(id)
                    }
                    None => None,
                };

                placed.insert(control_id(class, param.name()));
                row.controls
                    .push(layout_control(class, param, binding, companion_id));
                rows.push(row);
            }

            groups.push(LayoutGroup {
                name: group.name.clone(),
                title: group.title.clone(),
                rows,
            });
        }

        Ok(DialogLayout {
            namespace: desc.namespace.clone(),
            class_name: desc.class_name.clone(),
            title: desc.title.clone(),
            groups,
        })
    }
}

fn lookup<'c>(class: &'c ClassRegistry, name: &str) -> Result<&'c RegisteredParam, ComposeError> {
    class.lookup(name).ok_or_else(|| ComposeError::UnknownParam {
        class: class.class_name().to_string(),
        param: name.to_string(),
    })
}

fn control_id(class: &ClassRegistry, param: &str) -> String {
    format!("{}.{param}", class.class_name())
}

fn layout_control(
    class: &ClassRegistry,
    param: &RegisteredParam,
    binding: ControlBinding,
    companion_id: Option<String>,
) -> LayoutControl {
    let d = &param.descriptor;

    LayoutControl {
        id: control_id(class, &d.name),
        class: class.qualified_name(),
        param: param.index,
        name: d.name.clone(),
        kind: d.kind,
        label: d.display_title().to_string(),
        tooltip: d.doc.clone(),
        binding,
        companion_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binding::ProxyBinding, node::ParameterDescriptor};
    use paramkit_core::ControlKind;

    fn view() -> ClassRegistry {
        ClassRegistry::register_params(
            "Gui",
            "ViewParams",
            "User parameter:BaseApp/Preferences/View",
            [
                ParameterDescriptor::bool("UseVBO", false).title("Use VBO"),
                ParameterDescriptor::bool("HasColor", false),
                ParameterDescriptor::hex("Color", 0).proxy(ProxyBinding::color_with("HasColor")),
                ParameterDescriptor::hex("Highlight", 0).proxy(ProxyBinding::color_with("HasColor")),
                ParameterDescriptor::int("DrawStyle", 0)
                    .proxy(ProxyBinding::combo(["As is", "Points"])),
            ],
        )
        .unwrap()
    }

    fn compose(view: &ClassRegistry, desc: &DialogDescriptor) -> Result<DialogLayout, ComposeError> {
        let bindings = BindingRegistry::new();
        DialogComposer::new(&bindings).with_class(view).compose(desc)
    }

    #[test]
    fn shared_bare_name_needs_qualification() {
        let gui = view();
        let app = ClassRegistry::register_params(
            "App",
            "ViewParams",
            "User parameter:BaseApp/Preferences/AppView",
            [ParameterDescriptor::bool("UseVBO", true)],
        )
        .unwrap();
        let bindings = BindingRegistry::new();
        let composer = DialogComposer::new(&bindings).with_class(&gui).with_class(&app);

        let bare = DialogDescriptor::new("Gui", "DlgView", "View")
            .group(DialogGroup::new("Main", "Main").entries("ViewParams", ["UseVBO"]));
        assert_eq!(
            composer.compose(&bare).unwrap_err(),
            ComposeError::AmbiguousClass("ViewParams".to_string())
        );

        let qualified = DialogDescriptor::new("Gui", "DlgView", "View")
            .group(DialogGroup::new("Main", "Main").entries("App::ViewParams", ["UseVBO"]));
        let layout = composer.compose(&qualified).unwrap();
        assert_eq!(layout.groups[0].rows[0].controls[0].class, "App::ViewParams");
    }

    fn ids(row: &LayoutRow) -> Vec<&str> {
        row.controls.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn companion_shares_row_and_is_placed_first() {
        let view = view();
        let desc = DialogDescriptor::new("Gui", "DlgSettingsView", "Display").group(
            DialogGroup::new("General", "General").entries(
                "ViewParams",
                ["UseVBO", "Color", "HasColor", "Highlight", "DrawStyle"],
            ),
        );
        let layout = compose(&view, &desc).unwrap();
        let rows = &layout.groups[0].rows;

        assert_eq!(rows.len(), 4);
        assert_eq!(ids(&rows[0]), vec!["ViewParams.UseVBO"]);
        assert_eq!(ids(&rows[1]), vec!["ViewParams.HasColor", "ViewParams.Color"]);
        assert_eq!(ids(&rows[2]), vec!["ViewParams.Highlight"]);
        assert_eq!(
            rows[2].controls[0].companion_id.as_deref(),
            Some("ViewParams.HasColor")
        );
        assert_eq!(rows[0].controls[0].label, "Use VBO");
        assert_eq!(rows[3].controls[0].binding.control, ControlKind::ComboBox);
    }

    #[test]
    fn qualified_class_names_resolve() {
        let view = view();
        let desc = DialogDescriptor::new("", "Dlg", "T").group(
            DialogGroup::new("G", "G").entries("Gui::ViewParams", ["UseVBO"]),
        );

        assert_eq!(compose(&view, &desc).unwrap().controls().count(), 1);
    }

    #[test]
    fn unknown_references_are_errors() {
        let view = view();
        let bad_class = DialogDescriptor::new("", "Dlg", "T")
            .group(DialogGroup::new("G", "G").entries("Nope", ["UseVBO"]));
        let bad_param = DialogDescriptor::new("", "Dlg", "T")
            .group(DialogGroup::new("G", "G").entries("ViewParams", ["Nope"]));

        assert_eq!(
            compose(&view, &bad_class),
            Err(ComposeError::UnknownClass("Nope".into()))
        );
        assert!(matches!(
            compose(&view, &bad_param),
            Err(ComposeError::UnknownParam { .. })
        ));
    }

    #[test]
    fn duplicate_entries_are_errors() {
        let view = view();
        let desc = DialogDescriptor::new("", "Dlg", "T")
            .group(DialogGroup::new("A", "A").entries("ViewParams", ["UseVBO"]))
            .group(DialogGroup::new("B", "B").entries("ViewParams", ["UseVBO"]));

        assert!(matches!(
            compose(&view, &desc),
            Err(ComposeError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn layout_converts_to_runtime_spec() {
        let view = view();
        let desc = DialogDescriptor::new("Gui", "DlgSettingsView", "Display").group(
            DialogGroup::new("Colors", "Colors").entries("ViewParams", ["Color", "DrawStyle"]),
        );
        let spec = compose(&view, &desc).unwrap().to_spec();

        assert_eq!(spec.groups.len(), 1);
        assert_eq!(spec.row(0, 0).count(), 2);

        let color = &spec.controls[spec.find("ViewParams.Color").unwrap()];
        assert_eq!(color.companion.as_deref(), Some("ViewParams.HasColor"));
        assert_eq!(color.class, "Gui::ViewParams");
        assert_eq!(color.param, 2);

        let combo = &spec.controls[spec.find("ViewParams.DrawStyle").unwrap()];
        assert_eq!(combo.items, vec!["As is", "Points"]);
        assert_eq!(combo.row, 1);
    }

    #[test]
    fn descriptor_validation() {
        let desc = DialogDescriptor::new("", "Dlg", "T")
            .group(DialogGroup::new("A", "A"))
            .group(DialogGroup::new("A", "A").entries("ViewParams", ["UseVBO"]));

        let errs = desc.validate().unwrap_err();
        assert!(errs.contains("duplicate group"));
        assert!(errs.contains("no entries"));

        assert!(matches!(
            compose(&view(), &desc),
            Err(ComposeError::Descriptor(_))
        ));
    }
}
