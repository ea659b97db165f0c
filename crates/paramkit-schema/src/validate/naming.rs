use crate::{prelude::*, validate::reserved::is_reserved_word};
use convert_case::{Case, Casing};
use std::collections::{BTreeMap, BTreeSet};

/// Maximum length for parameter and class identifiers.
pub const MAX_NAME_LEN: usize = 64;

/// ASCII identifier: a letter or underscore, then letters, digits and
/// underscores. Not a lone underscore.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    s != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// snake_case accessor stem for a parameter or property name.
#[must_use]
pub fn accessor_name(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Validate a name used to derive generated identifiers.
pub fn validate_name(label: &str, name: &str, errs: &mut ErrorTree) {
    if name.len() > MAX_NAME_LEN {
        err!(errs, "{label} '{name}' exceeds max length {MAX_NAME_LEN}");
    }
    if !is_identifier(name) {
        err!(errs, "{label} '{name}' is not a valid identifier");
        return;
    }

    let snake = accessor_name(name);
    if is_reserved_word(&snake) || is_reserved_word(name) {
        err!(errs, "{label} '{name}' maps to reserved accessor name '{snake}'");
    }
}

/// Methods generated for one parameter: getter plus the prefixed forms.
#[must_use]
pub fn accessor_family(name: &str) -> [String; 6] {
    let stem = accessor_name(name);

    [
        format!("default_{stem}"),
        format!("set_{stem}"),
        format!("remove_{stem}"),
        format!("doc_{stem}"),
        format!("on_{stem}_changed"),
        stem,
    ]
}

/// Two names whose generated methods overlap (`FontSize` and `fontSize`,
/// or `X` and `DefaultX`) are reported once per pair.
pub fn validate_accessor_collisions<'a>(
    names: impl IntoIterator<Item = &'a str>,
    errs: &mut ErrorTree,
) {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    let mut reported = BTreeSet::new();

    for name in names {
        for method in accessor_family(name) {
            match owners.get(&method) {
                Some(&prev) if prev != name => {
                    if reported.insert((prev, name)) {
                        err!(errs, "'{prev}' and '{name}' both generate accessor '{method}'");
                    }
                }
                Some(_) => {}
                None => {
                    owners.insert(method, name);
                }
            }
        }
    }
}
