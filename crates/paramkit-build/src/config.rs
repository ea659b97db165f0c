use crate::Error;
use serde::{Deserialize, Serialize};

///
/// GeneratorConfig
///
/// Knobs for emitted code. Loaded from the `[generator]` table of a TOML
/// file or built in code; every field has a default.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path generated code uses to reach the runtime crate.
    pub runtime: String,

    /// Attach descriptor docs to generated items.
    pub emit_docs: bool,

    /// Generate `remove_*` accessors.
    pub emit_remove: bool,

    /// Comment lines written at the top of every rendered file.
    pub header: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime: "::paramkit".to_string(),
            emit_docs: true,
            emit_remove: true,
            header: None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    generator: GeneratorConfig,
}

impl GeneratorConfig {
    /// Parse a TOML document with an optional `[generator]` table.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let file: ConfigFile = toml::from_str(text)?;
        file.generator.runtime_path()?;

        Ok(file.generator)
    }

    #[must_use]
    pub fn runtime(mut self, path: impl Into<String>) -> Self {
        self.runtime = path.into();
        self
    }

    #[must_use]
    pub const fn without_docs(mut self) -> Self {
        self.emit_docs = false;
        self
    }

    #[must_use]
    pub const fn without_remove(mut self) -> Self {
        self.emit_remove = false;
        self
    }

    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn runtime_path(&self) -> Result<syn::Path, Error> {
        syn::parse_str(&self.runtime).map_err(|_| Error::RuntimePath(self.runtime.clone()))
    }
}
