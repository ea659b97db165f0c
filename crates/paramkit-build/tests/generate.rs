use paramkit_build::{ArtifactKind, Error, Generator, GeneratorConfig, OUTPUT_FILE};
use paramkit_schema::{
    load,
    node::{ClassSpec, ParameterDescriptor},
};
use proptest::prelude::*;
use std::{fs, path::PathBuf};

const FILE: &str = r#"
    [[class]]
    namespace = "Gui"
    class_name = "ViewParams"
    root = "User parameter:BaseApp/Preferences/View"
    emits_change_signal = true

    [[class.param]]
    name = "UseVBO"
    kind = "Bool"
    default = false
    on_change = true

    [[class.param]]
    name = "HasColor"
    kind = "Bool"
    default = true

    [[class.param]]
    name = "Color"
    kind = "Hex"
    default = 0xFF0000FF
    proxy = { type = "color", companion = "HasColor" }

    [[class.param]]
    name = "Width"
    kind = "Float"
    default = 1.5
    proxy = { type = "spin_box", min = 0.5, max = 8.0, step = 0.5, decimals = 1 }

    [[class]]
    class_name = "Broken"
    root = "Root"

    [[class.param]]
    name = "Scale"
    kind = "Float"
    default = 1.0
    proxy = { type = "color" }

    [[choices]]
    name = "DrawStyle"

    [[choices.item]]
    name = "As Is"

    [[choices.item]]
    name = "Points"

    [[dialog]]
    class_name = "DlgSettingsView"
    title = "Display"

    [[dialog.group]]
    name = "Colors"
    title = "Colors"

    [[dialog.group.entry]]
    class = "ViewParams"
    param = "Color"

    [[dialog]]
    class_name = "DlgBroken"
    title = "Broken"

    [[dialog.group]]
    name = "Main"
    title = "Main"

    [[dialog.group.entry]]
    class = "Broken"
    param = "Scale"
"#;

fn out_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("paramkit-build-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    dir
}

#[test]
fn failing_units_do_not_take_down_the_batch() {
    let output = Generator::default().generate_batch(load::from_str(FILE).unwrap());

    let failed: Vec<_> = output.failures.iter().map(|f| f.unit.as_str()).collect();
    assert_eq!(failed, ["Broken", "DlgBroken"]);

    let units: Vec<_> = output.units().collect();
    assert_eq!(units, ["ViewParams", "ViewParams", "DrawStyle", "DlgSettingsView"]);
    assert_eq!(output.artifacts[0].kind, ArtifactKind::Declaration);
    assert_eq!(output.artifacts[1].kind, ArtifactKind::Definition);
    assert!(!output.is_ok());
}

#[test]
fn unit_names_are_unique_per_batch() {
    let file = r#"
        [[class]]
        namespace = "Gui"
        class_name = "ViewParams"
        root = "User parameter:BaseApp/Preferences/View"

        [[class.param]]
        name = "UseVBO"
        kind = "Bool"
        default = false

        [[class]]
        namespace = "App"
        class_name = "ViewParams"
        root = "User parameter:BaseApp/Preferences/AppView"

        [[class.param]]
        name = "UseVBO"
        kind = "Bool"
        default = true

        [[choices]]
        name = "ViewParams"

        [[choices.item]]
        name = "Flat"
    "#;
    let output = Generator::default().generate_batch(load::from_str(file).unwrap());

    let failed: Vec<_> = output.failures.iter().map(|f| f.unit.as_str()).collect();
    assert_eq!(failed, ["ViewParams", "ViewParams"]);
    assert!(
        output
            .failures
            .iter()
            .all(|f| matches!(f.error, Error::DuplicateUnit(ref n) if n == "ViewParams"))
    );
    assert_eq!(output.artifacts.len(), 2);
    syn::parse_file(&output.render(&GeneratorConfig::default())).unwrap();
}

#[test]
fn rendered_batch_is_valid_rust() {
    let config = GeneratorConfig::default().header("generated by paramkit\ndo not edit");
    let output = Generator::new(config.clone()).generate_batch(load::from_str(FILE).unwrap());
    let text = output.render(&config);

    assert!(text.starts_with("// generated by paramkit\n// do not edit\n"));
    syn::parse_file(&text).unwrap();
}

#[test]
fn build_files_writes_successful_units() {
    let dir = out_dir("write");
    let input = dir.join("params.toml");
    fs::write(&input, FILE).unwrap();

    let output = Generator::default().build_files(&[&input], &dir).unwrap();
    let written = fs::read_to_string(dir.join(OUTPUT_FILE)).unwrap();

    assert_eq!(output.failures.len(), 2);
    assert!(written.contains("ViewParamsAccess"));
    assert!(!written.contains("BrokenIndex"));
}

#[test]
fn missing_input_is_a_load_error() {
    let dir = out_dir("missing");

    assert!(matches!(
        Generator::default().build_files(&[dir.join("absent.toml")], &dir),
        Err(Error::Schema(paramkit_schema::Error::Load(_)))
    ));
}

#[test]
fn config_from_toml() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        [generator]
        runtime = "crate::runtime"
        emit_remove = false
        "#,
    )
    .unwrap();

    assert_eq!(config.runtime, "crate::runtime");
    assert!(!config.emit_remove);
    assert!(config.emit_docs);

    assert!(matches!(
        GeneratorConfig::from_toml_str("[generator]\nruntime = \"not a path\""),
        Err(Error::RuntimePath(_))
    ));
}

#[test]
fn generating_twice_is_byte_identical() {
    let config = GeneratorConfig::default();
    let render = || {
        Generator::new(config.clone())
            .generate_batch(load::from_str(FILE).unwrap())
            .render(&config)
    };

    assert_eq!(render(), render());
}

proptest! {
    #[test]
    fn any_valid_class_renders_to_parseable_rust(
        params in prop::collection::btree_map("[a-z]{1,6}", 0..4_usize, 1..8),
        signal in any::<bool>(),
    ) {
        let descriptors = params.iter().map(|(stem, kind)| {
            let name = format!("Param{stem}");
            match kind {
                0 => ParameterDescriptor::bool(name, true).on_change(),
                1 => ParameterDescriptor::int(name, -3),
                2 => ParameterDescriptor::float(name, 0.25),
                _ => ParameterDescriptor::string(name, "text"),
            }
        });
        let mut spec = ClassSpec::new("App", "Random", "Root").params(descriptors);
        spec.emits_change_signal = signal;

        let class = Generator::default().generate_class(spec).unwrap();
        let text = format!("{}\n{}", class.declaration.render(), class.definition.render());

        prop_assert!(syn::parse_file(&text).is_ok());
        prop_assert_eq!(class.registry.len(), params.len());
    }
}
