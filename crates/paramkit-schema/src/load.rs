//! Descriptor files.
//!
//! One TOML file may hold any mix of parameter classes, property catalogs,
//! choice sets and dialogs:
//!
//! ```toml
//! [[class]]
//! namespace = "Gui"
//! class_name = "ViewParams"
//! root = "User parameter:BaseApp/Preferences/View"
//!
//! [[class.param]]
//! name = "UseVBO"
//! kind = "Bool"
//! default = false
//! on_change = true
//! ```

use crate::{node::ChoiceSet, prelude::*};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// LoadError
///

#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed descriptor file: {0}")]
    Toml(#[from] toml::de::Error),
}

///
/// DescriptorFile
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DescriptorFile {
    #[serde(default, rename = "class", skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassSpec>,

    #[serde(default, rename = "catalog", skip_serializing_if = "Vec::is_empty")]
    pub catalogs: Vec<PropertyCatalogSpec>,

    #[serde(default, rename = "choices", skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceSet>,

    #[serde(default, rename = "dialog", skip_serializing_if = "Vec::is_empty")]
    pub dialogs: Vec<DialogDescriptor>,
}

impl DescriptorFile {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.catalogs.is_empty()
            && self.choices.is_empty()
            && self.dialogs.is_empty()
    }

    /// Append another file's contents.
    pub fn merge(&mut self, other: Self) {
        self.classes.extend(other.classes);
        self.catalogs.extend(other.catalogs);
        self.choices.extend(other.choices);
        self.dialogs.extend(other.dialogs);
    }
}

pub fn from_str(text: &str) -> Result<DescriptorFile, LoadError> {
    Ok(toml::from_str(text)?)
}

pub fn from_path(path: impl AsRef<Path>) -> Result<DescriptorFile, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    from_str(&text)
}

/// A single class, written as a top-level table.
pub fn class_spec(text: &str) -> Result<ClassSpec, LoadError> {
    Ok(toml::from_str(text)?)
}
