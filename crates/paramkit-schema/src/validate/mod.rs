//! Shared validation helpers used by the descriptor nodes.

pub mod naming;
pub mod reserved;

use crate::prelude::*;

/// Store paths and sub-sections: non-empty slash-separated segments, no
/// control characters.
pub fn validate_store_segment(label: &str, path: &str, errs: &mut ErrorTree) {
    if path.trim().is_empty() {
        err!(errs, "{label} is empty");
        return;
    }
    if path.chars().any(char::is_control) {
        err!(errs, "{label} '{}' contains control characters", path.escape_debug());
    }
    if path.trim_matches('/').split('/').any(str::is_empty) {
        err!(errs, "{label} '{path}' contains an empty segment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_segments() {
        let mut errs = ErrorTree::new();
        validate_store_segment("root", "User parameter:BaseApp/Preferences/View", &mut errs);
        validate_store_segment("group", "Asymptote", &mut errs);
        assert!(errs.is_empty());

        validate_store_segment("root", "  ", &mut errs);
        validate_store_segment("group", "a//b", &mut errs);
        assert_eq!(errs.len(), 2);
    }
}
