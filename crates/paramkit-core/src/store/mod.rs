mod memory;

pub use memory::MemoryStore;

use crate::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// StorePath
///
/// Slash-separated location in the hierarchical store, e.g.
/// `User parameter:BaseApp/Preferences/View/UseVBO`.
///

#[derive(Clone, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct StorePath(String);

impl StorePath {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Append one or more segments; empty segments and stray slashes are
    /// dropped.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut out = self.0.trim_end_matches('/').to_string();

        for part in segment.split('/').filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(part);
        }

        Self(out)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment (the key name).
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Everything before the final segment.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('/').map(|(parent, _)| Self(parent.to_string()))
    }
}

impl From<&str> for StorePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for StorePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

///
/// WatchId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WatchId(pub u64);

/// Callback fired after a watched key changes externally.
pub type WatchCallback = Arc<dyn Fn(&StorePath) + Send + Sync>;

///
/// ParamStore
///
/// Hierarchical key/value store holding parameter values. Implementations
/// must deliver watch callbacks without holding internal locks, as the
/// callback reads the store back.
///

pub trait ParamStore: Send + Sync {
    fn get(&self, path: &StorePath) -> Option<Value>;

    fn set(&self, path: &StorePath, value: Value);

    /// Returns whether a value was present.
    fn remove(&self, path: &StorePath) -> bool;

    fn watch(&self, path: &StorePath, callback: WatchCallback) -> WatchId;

    fn unwatch(&self, id: WatchId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        let root = StorePath::new("User parameter:BaseApp/Preferences/");

        assert_eq!(
            root.join("/View//UseVBO").as_str(),
            "User parameter:BaseApp/Preferences/View/UseVBO"
        );
        assert_eq!(root.join("").as_str(), "User parameter:BaseApp/Preferences");
    }

    #[test]
    fn join_on_empty_root() {
        assert_eq!(StorePath::default().join("a/b").as_str(), "a/b");
    }

    #[test]
    fn leaf_and_parent() {
        let p = StorePath::new("Mod/Mesh/Asymptote/Width");

        assert_eq!(p.leaf(), "Width");
        assert_eq!(p.parent(), Some(StorePath::new("Mod/Mesh/Asymptote")));
        assert_eq!(StorePath::new("Top").parent(), None);
    }
}
