use crate::{
    Error,
    binding::BindingRegistry,
    prelude::*,
    symbol::SymbolTable,
    validate::{
        naming::{is_identifier, validate_accessor_collisions, validate_name},
        validate_store_segment,
    },
};
use paramkit_core::{Constraints, Gate, ParamInfo, StorePath};
use std::{borrow::Cow, collections::BTreeSet};

///
/// ClassSpec
///
/// Unregistered parameter class, as written in code or a descriptor file.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClassSpec {
    #[serde(default)]
    pub namespace: String,

    pub class_name: String,

    /// Store root, e.g. `User parameter:BaseApp/Preferences/View`.
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subpath: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(default)]
    pub emits_change_signal: bool,

    #[serde(default, rename = "param")]
    pub params: Vec<ParameterDescriptor>,
}

impl ClassSpec {
    pub fn new(
        namespace: impl Into<String>,
        class_name: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
            root: root.into(),
            default_subpath: None,
            doc: String::new(),
            emits_change_signal: false,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn default_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.default_subpath = Some(subpath.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub const fn signal(mut self) -> Self {
        self.emits_change_signal = true;
        self
    }

    #[must_use]
    pub fn param(mut self, param: ParameterDescriptor) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.params.extend(params);
        self
    }
}

impl ValidateNode for ClassSpec {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        validate_name("class", &self.class_name, &mut errs);
        if !self.namespace.is_empty() && !self.namespace.split("::").all(is_identifier) {
            err!(errs, "namespace '{}' is not a path of identifiers", self.namespace);
        }
        validate_store_segment("store root", &self.root, &mut errs);
        if let Some(sub) = &self.default_subpath {
            validate_store_segment("default subpath", sub, &mut errs);
        }

        if self.params.is_empty() {
            err!(errs, "class has no parameters");
        }

        let mut names = BTreeSet::new();
        for p in &self.params {
            if !names.insert(p.name.as_str()) {
                errs.add_at(p.route_key(), format!("duplicate parameter '{}'", p.name));
            }
            errs.merge_result(p.route_key(), p.validate());
        }
        validate_accessor_collisions(names.iter().copied(), &mut errs);

        errs.result()
    }

    fn route_key(&self) -> String {
        self.class_name.clone()
    }
}

///
/// RegisteredParam
///

#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredParam {
    pub index: usize,
    pub descriptor: ParameterDescriptor,
    pub key: StorePath,

    /// Default with literals normalized to the kind.
    pub default: DefaultValue,
}

impl RegisteredParam {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

///
/// ClassRegistry
///
/// Validated, indexed parameter table for one class. Index is insertion
/// position; registration of the same spec always yields the same table.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ClassRegistry {
    namespace: String,
    class_name: String,
    root: StorePath,
    default_subpath: Option<String>,
    doc: String,
    emits_change_signal: bool,
    params: Vec<RegisteredParam>,
}

impl ClassRegistry {
    pub fn register(spec: ClassSpec) -> Result<Self, Error> {
        spec.validate().map_err(|errors| Error::Descriptor {
            unit: spec.class_name.clone(),
            errors,
        })?;

        let root = StorePath::new(spec.root.as_str());
        let params = spec
            .params
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| {
                let key = effective_key(&root, spec.default_subpath.as_deref(), &descriptor);
                let default = match &descriptor.default {
                    DefaultValue::Literal(v) => descriptor
                        .kind
                        .normalize(v)
                        .map_or_else(|| descriptor.default.clone(), DefaultValue::Literal),
                    DefaultValue::Symbol(_) => descriptor.default.clone(),
                };

                RegisteredParam {
                    index,
                    descriptor,
                    key,
                    default,
                }
            })
            .collect();

        Ok(Self {
            namespace: spec.namespace,
            class_name: spec.class_name,
            root,
            default_subpath: spec.default_subpath,
            doc: spec.doc,
            emits_change_signal: spec.emits_change_signal,
            params,
        })
    }

    /// Shorthand for a class with no extra settings.
    pub fn register_params(
        namespace: &str,
        class_name: &str,
        root: &str,
        params: impl IntoIterator<Item = ParameterDescriptor>,
    ) -> Result<Self, Error> {
        Self::register(ClassSpec::new(namespace, class_name, root).params(params))
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// `Namespace::Class`, or the bare class name without a namespace.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}::{}", self.namespace, self.class_name)
        }
    }

    #[must_use]
    pub const fn root(&self) -> &StorePath {
        &self.root
    }

    #[must_use]
    pub fn default_subpath(&self) -> Option<&str> {
        self.default_subpath.as_deref()
    }

    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    #[must_use]
    pub const fn emits_change_signal(&self) -> bool {
        self.emits_change_signal
    }

    #[must_use]
    pub fn params(&self) -> &[RegisteredParam] {
        &self.params
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RegisteredParam> {
        self.params.get(index)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RegisteredParam> {
        self.params.iter().find(|p| p.descriptor.name == name)
    }

    /// Runtime table for interpreted hosts: symbols resolved, bindings
    /// turned into companion gates, constraints bound.
    pub fn to_table(
        &self,
        bindings: &BindingRegistry,
        symbols: &SymbolTable,
    ) -> Result<Vec<ParamInfo>, Error> {
        let mut table = Vec::with_capacity(self.params.len());

        for p in &self.params {
            let d = &p.descriptor;
            let binding = bindings.resolve(self, p)?;
            let default = match &p.default {
                DefaultValue::Literal(v) => v.clone(),
                DefaultValue::Symbol(s) => symbols.resolve_as(s, d.kind)?,
            };

            let mut info = ParamInfo::new(p.index, Cow::Owned(d.name.clone()), d.kind, default)
                .with_doc(Cow::Owned(d.doc.clone()))
                .with_key(p.key.clone())
                .with_flags(d.parsed_flags());

            if d.on_change {
                info = info.with_notify();
            }
            if let Some(companion) = binding.companion {
                info.gate = Some(Gate {
                    companion: companion.index,
                    sentinel: binding.sentinel,
                });
            }
            if let Some(c) = &d.constraint {
                let [min, max, step] = symbols.resolve_constraint(c)?;
                info = info.with_constraints(Constraints::new(min, max, step));
            }

            table.push(info);
        }

        Ok(table)
    }
}

// root / (subpath.group | default_subpath) / (subpath.key | name)
fn effective_key(root: &StorePath, default_subpath: Option<&str>, d: &ParameterDescriptor) -> StorePath {
    let group = d
        .subpath
        .as_ref()
        .and_then(|s| s.group.as_deref())
        .or(default_subpath)
        .unwrap_or_default();
    let leaf = d
        .subpath
        .as_ref()
        .and_then(|s| s.key.as_deref())
        .unwrap_or(&d.name);

    root.join(group).join(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binding::ProxyBinding, types::IntConstraint};
    use paramkit_core::ParamKind;

    const ROOT: &str = "User parameter:BaseApp/Preferences/View";

    fn view_spec() -> ClassSpec {
        ClassSpec::new("Gui", "ViewParams", ROOT).params([
            ParameterDescriptor::bool("UseVBO", false).on_change(),
            ParameterDescriptor::float("Scale", 1.0),
            ParameterDescriptor::int("DrawStyle", 0),
        ])
    }

    #[test]
    fn index_is_insertion_position() {
        let reg = ClassRegistry::register(view_spec()).unwrap();

        let order: Vec<_> = reg.params().iter().map(|p| (p.index, p.name())).collect();
        assert_eq!(order, vec![(0, "UseVBO"), (1, "Scale"), (2, "DrawStyle")]);
        assert_eq!(reg.qualified_name(), "Gui::ViewParams");
    }

    #[test]
    fn re_registering_is_stable() {
        let a = ClassRegistry::register(view_spec()).unwrap();
        let b = ClassRegistry::register(view_spec()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let spec = view_spec().param(ParameterDescriptor::bool("UseVBO", true));

        match ClassRegistry::register(spec) {
            Err(Error::Descriptor { unit, errors }) => {
                assert_eq!(unit, "ViewParams");
                assert!(errors.contains("duplicate parameter 'UseVBO'"));
            }
            other => panic!("expected descriptor error, got {other:?}"),
        }
    }

    #[test]
    fn all_errors_are_collected() {
        let spec = ClassSpec::new("Gui", "ViewParams", "")
            .param(ParameterDescriptor::new("Flag", ParamKind::Bool, DefaultValue::literal("yes")))
            .param(ParameterDescriptor::int("match", 0));

        let Err(Error::Descriptor { errors, .. }) = ClassRegistry::register(spec) else {
            panic!("expected descriptor error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.flatten().iter().any(|(route, _)| route == "Flag"));
    }

    #[test]
    fn keys_follow_subpath_rules() {
        let spec = ClassSpec::new("Mesh", "MeshParams", "User parameter:BaseApp/Preferences/Mod/Mesh")
            .default_subpath("Export")
            .params([
                ParameterDescriptor::float("AsymptoteWidth", 0.0)
                    .subpath("Asymptote")
                    .key("Width"),
                ParameterDescriptor::bool("ExportAmf", true),
                ParameterDescriptor::int("Renamed", 0).key("OldName"),
            ]);
        let reg = ClassRegistry::register(spec).unwrap();

        let keys: Vec<_> = reg.params().iter().map(|p| p.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "User parameter:BaseApp/Preferences/Mod/Mesh/Asymptote/Width",
                "User parameter:BaseApp/Preferences/Mod/Mesh/Export/ExportAmf",
                "User parameter:BaseApp/Preferences/Mod/Mesh/Export/OldName",
            ]
        );
    }

    #[test]
    fn literal_defaults_are_normalized() {
        let reg = ClassRegistry::register_params(
            "",
            "Sizes",
            "Root",
            [ParameterDescriptor::new("Scale", ParamKind::Float, DefaultValue::literal(3))],
        )
        .unwrap();

        assert_eq!(reg.params()[0].default, DefaultValue::literal(3.0));
        assert_eq!(reg.qualified_name(), "Sizes");
    }

    #[test]
    fn table_resolves_symbols_gates_and_constraints() {
        let spec = ClassSpec::new("App", "LinkParams", "Root").params([
            ParameterDescriptor::bool("HasColor", true),
            ParameterDescriptor::hex("Color", 0xFF).proxy(ProxyBinding::color_with("HasColor")),
            ParameterDescriptor::new(
                "ElementCount",
                ParamKind::Int,
                DefaultValue::symbol("INT_MAX").unwrap(),
            )
            .constrained(IntConstraint::new(0, SymbolRef::new("INT_MAX").unwrap(), 1))
            .on_change(),
        ]);
        let reg = ClassRegistry::register(spec).unwrap();
        let table = reg
            .to_table(&BindingRegistry::new(), &SymbolTable::with_builtins())
            .unwrap();

        assert_eq!(table[1].gate, Some(Gate { companion: 0, sentinel: Value::UInt(0) }));
        assert_eq!(table[2].default, Value::Int(i64::from(i32::MAX)));
        assert_eq!(
            table[2].constraints,
            Some(Constraints::new(0, i64::from(i32::MAX), 1))
        );
        assert!(table[2].notify);
        assert_eq!(table[0].key.as_str(), "Root/HasColor");
    }

    #[test]
    fn unresolved_symbol_is_an_error() {
        let reg = ClassRegistry::register_params(
            "",
            "P",
            "Root",
            [ParameterDescriptor::new(
                "Limit",
                ParamKind::Int,
                DefaultValue::symbol("NOT_DEFINED").unwrap(),
            )],
        )
        .unwrap();

        assert!(matches!(
            reg.to_table(&BindingRegistry::new(), &SymbolTable::with_builtins()),
            Err(Error::Symbol(_))
        ));
    }
}
