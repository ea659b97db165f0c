use paramkit_core::{MemoryStore, ParamKind, ParamSet};
use paramkit_schema::{
    Error,
    binding::BindingRegistry,
    load::{self, DescriptorFile},
    node::{ClassRegistry, ClassSpec, DialogComposer, ParameterDescriptor, PropertyCatalog},
    symbol::SymbolTable,
    types::DefaultValue,
};
use proptest::prelude::*;
use std::sync::Arc;

const FILE: &str = r#"
    [[class]]
    namespace = "Gui"
    class_name = "ViewParams"
    root = "User parameter:BaseApp/Preferences/View"
    emits_change_signal = true

    [[class.param]]
    name = "HasColor"
    kind = "Bool"
    default = false
    title = "Override color"

    [[class.param]]
    name = "Color"
    kind = "Hex"
    default = 0xFF0000FF
    proxy = { type = "color", companion = "HasColor" }

    [[class.param]]
    name = "DrawStyle"
    kind = "Int"
    default = 0
    proxy = { type = "combo_box", items = [{ label = "As is" }, { label = "Points" }] }

    [[class.param]]
    name = "MaxCache"
    kind = "Int"
    default = { symbol = "INT_MAX" }
    constraint = { min = 0, max = { symbol = "INT_MAX" }, step = 1 }

    [[catalog]]
    name = "LinkProps"

    [[catalog.property]]
    name = "LinkPlacement"
    property_type = { tag = "PropertyPlacement", value_type = "Placement" }

    [[catalog.property]]
    name = "ElementCount"
    property_type = { tag = "PropertyInteger", value_type = "i64" }
    prop_flags = "Hidden"

    [[catalog.feature]]
    class_name = "LinkExtension"
    category = "Link"
    properties = ["LinkPlacement", "ElementCount"]

    [[choices]]
    name = "DrawStyle"

    [[choices.item]]
    name = "As Is"

    [[choices.item]]
    name = "Points"

    [[dialog]]
    namespace = "Gui"
    class_name = "DlgSettingsView"
    title = "Display"

    [[dialog.group]]
    name = "Colors"
    title = "Colors"

    [[dialog.group.entry]]
    class = "ViewParams"
    param = "Color"

    [[dialog.group.entry]]
    class = "ViewParams"
    param = "DrawStyle"
"#;

fn file() -> DescriptorFile {
    load::from_str(FILE).unwrap()
}

#[test]
fn every_unit_kind_loads() {
    let file = file();

    assert_eq!(file.classes.len(), 1);
    assert_eq!(file.catalogs.len(), 1);
    assert_eq!(file.choices.len(), 1);
    assert_eq!(file.dialogs.len(), 1);
    assert_eq!(file.dialogs[0].groups[0].entries.len(), 2);
}

#[test]
fn interpreted_table_drives_a_param_set() {
    let class = ClassRegistry::register(file().classes.remove(0)).unwrap();
    let table = class
        .to_table(&BindingRegistry::new(), &SymbolTable::with_builtins())
        .unwrap();

    let store = Arc::new(MemoryStore::new());
    let set = ParamSet::open(class.qualified_name(), table, store.clone(), true).unwrap();

    assert_eq!(set.class(), "Gui::ViewParams");
    assert_eq!(set.read::<i64>(3), i64::from(i32::MAX));

    // gated by HasColor
    assert_eq!(set.read::<u32>(1), 0);
    set.write(0, true).unwrap();
    assert_eq!(set.read::<u32>(1), 0xFF00_00FF);

    // clamped to the bound constraint
    set.write(3, -5_i64).unwrap();
    assert_eq!(set.read::<i64>(3), 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn dialog_places_companion_ahead_of_its_control() {
    let file = file();
    let class = ClassRegistry::register(file.classes[0].clone()).unwrap();
    let bindings = BindingRegistry::new();

    let layout = DialogComposer::new(&bindings)
        .with_class(&class)
        .compose(&file.dialogs[0])
        .unwrap();
    let ids: Vec<_> = layout.controls().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, ["ViewParams.HasColor", "ViewParams.Color", "ViewParams.DrawStyle"]);
    assert_eq!(layout.groups[0].rows[0].controls.len(), 2);
    assert_eq!(layout.to_spec().controls.len(), 3);
}

#[test]
fn catalog_from_file_registers() {
    let catalog = PropertyCatalog::register(file().catalogs.remove(0)).unwrap();
    let feature = catalog.feature("LinkExtension").unwrap();

    assert_eq!(catalog.feature_properties(feature).count(), 2);
}

#[test]
fn descriptor_file_survives_json() {
    let file = file();
    let json = serde_json::to_string(&file).unwrap();
    let back: DescriptorFile = serde_json::from_str(&json).unwrap();

    assert_eq!(back, file);
}

#[test]
fn errors_name_the_unit() {
    let spec = ClassSpec::new("App", "Broken", "Root")
        .param(ParameterDescriptor::int("Width", 1))
        .param(ParameterDescriptor::new("Size", ParamKind::Bool, DefaultValue::literal(3)));

    let err = ClassRegistry::register(spec).unwrap_err();
    assert!(matches!(err, Error::Descriptor { ref unit, .. } if unit == "Broken"));
    assert!(err.to_string().contains("Size"));
}

proptest! {
    #[test]
    fn registration_keeps_declaration_order(stems in prop::collection::btree_set("[a-z]{1,8}", 1..12)) {
        let names: Vec<String> = stems.iter().map(|s| format!("Param{s}")).collect();
        let spec = ClassSpec::new("", "Generated", "Root")
            .params(names.iter().map(|n| ParameterDescriptor::int(n, 0)));

        let class = ClassRegistry::register(spec).unwrap();

        for (i, name) in names.iter().enumerate() {
            let p = class.lookup(name).unwrap();
            prop_assert_eq!(p.index, i);
            prop_assert_eq!(p.key.leaf(), name.as_str());
        }
    }

    #[test]
    fn prefixed_names_collide_with_their_stem(stem in "[A-Z][a-z]{1,8}") {
        let spec = ClassSpec::new("", "Clash", "Root").params([
            ParameterDescriptor::int(&stem, 0),
            ParameterDescriptor::int(format!("Default{stem}"), 0),
        ]);

        let Err(Error::Descriptor { errors, .. }) = ClassRegistry::register(spec) else {
            return Err(TestCaseError::fail("collision accepted"));
        };
        prop_assert!(errors.contains("both generate accessor"));
    }
}
