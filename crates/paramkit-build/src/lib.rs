//! Code generation for paramkit descriptors.
//!
//! Each registered class yields two artifacts: a declaration (index enum,
//! accessor struct and trait) and a definition (static table, `open`, trait
//! impl). Dialogs, property catalogs and choice sets yield one artifact
//! each. Artifacts are token streams rendered to Rust source.

mod choice;
mod config;
mod declare;
mod define;
mod dialog;
mod helper;
mod macros;
mod property;

pub use choice::emit_choices;
pub use config::GeneratorConfig;
pub use declare::emit_declaration;
pub use define::emit_definition;
pub use dialog::emit_dialog;
pub use property::emit_properties;

use derive_more::Display;
use paramkit_schema::{
    binding::{BindingError, BindingRegistry},
    load::{self, DescriptorFile, LoadError},
    node::{ClassRegistry, ClassSpec, ComposeError, DialogComposer, PropertyCatalog},
};
use proc_macro2::TokenStream;
use std::{
    collections::BTreeSet,
    fmt, fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// File written into `OUT_DIR` by `build!`.
pub const OUTPUT_FILE: &str = "paramkit.rs";

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("'{0}' is already generated by another unit in this batch")]
    DuplicateUnit(String),

    #[error("invalid runtime path '{0}'")]
    RuntimePath(String),

    #[error("{unit}: '{text}' is not a valid Rust {what}")]
    Syntax {
        unit: String,
        text: String,
        what: &'static str,
    },

    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Schema(#[from] paramkit_schema::Error),
}

impl From<BindingError> for Error {
    fn from(e: BindingError) -> Self {
        Self::Schema(e.into())
    }
}

impl From<ComposeError> for Error {
    fn from(e: ComposeError) -> Self {
        Self::Schema(e.into())
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Self::Schema(e.into())
    }
}

///
/// ArtifactKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum ArtifactKind {
    Choices,
    Declaration,
    Definition,
    Dialog,
    Properties,
}

///
/// Artifact
///
/// Generated code for one unit (class, dialog, catalog or choice set).
///

#[derive(Clone, Debug)]
pub struct Artifact {
    pub unit: String,
    pub kind: ArtifactKind,
    pub tokens: TokenStream,
}

impl Artifact {
    pub(crate) fn new(unit: impl Into<String>, kind: ArtifactKind, tokens: TokenStream) -> Self {
        let artifact = Self {
            unit: unit.into(),
            kind,
            tokens,
        };
        tracing::debug!(unit = %artifact.unit, kind = %artifact.kind, "artifact emitted");

        artifact
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.to_string()
    }
}

///
/// ClassArtifacts
///

#[derive(Clone, Debug)]
pub struct ClassArtifacts {
    pub registry: ClassRegistry,
    pub declaration: Artifact,
    pub definition: Artifact,
}

///
/// Failure
///

#[derive(Debug)]
pub struct Failure {
    pub unit: String,
    pub error: Error,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.error)
    }
}

///
/// BatchOutput
///
/// Artifacts of every unit that generated, plus the failures. A failing
/// unit never removes another unit's artifacts.
///

#[derive(Debug, Default)]
pub struct BatchOutput {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<Failure>,
}

impl BatchOutput {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|a| a.unit.as_str())
    }

    fn fail(&mut self, unit: String, error: Error) {
        tracing::warn!(%unit, %error, "unit failed to generate");
        self.failures.push(Failure { unit, error });
    }

    /// One source file: the header banner, then each artifact on its own line.
    #[must_use]
    pub fn render(&self, config: &GeneratorConfig) -> String {
        let mut out = String::new();

        if let Some(header) = &config.header {
            for line in header.lines() {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
        }
        for artifact in &self.artifacts {
            out.push_str(&artifact.render());
            out.push('\n');
        }

        out
    }
}

///
/// Generator
///

#[derive(Clone, Debug, Default)]
pub struct Generator {
    config: GeneratorConfig,
    bindings: BindingRegistry,
}

impl Generator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            bindings: BindingRegistry::new(),
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: BindingRegistry) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[must_use]
    pub const fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// Register one class and emit both of its artifacts.
    pub fn generate_class(&self, spec: ClassSpec) -> Result<ClassArtifacts, Error> {
        let registry = ClassRegistry::register(spec)?;
        tracing::debug!(class = registry.class_name(), params = registry.len(), "class registered");

        let declaration = emit_declaration(&registry, &self.config)?;
        let definition = emit_definition(&registry, &self.bindings, &self.config)?;

        Ok(ClassArtifacts {
            registry,
            declaration,
            definition,
        })
    }

    /// Generate every unit of a descriptor file. Dialogs see only the
    /// classes that registered. Unit names share one item namespace, so a
    /// name already taken in the batch fails the later unit.
    #[must_use]
    pub fn generate_batch(&self, file: DescriptorFile) -> BatchOutput {
        let mut out = BatchOutput::default();
        let mut registries = Vec::new();
        let mut claimed = BTreeSet::new();

        for spec in file.classes {
            let unit = spec.class_name.clone();
            if !claimed.insert(unit.clone()) {
                out.fail(unit.clone(), Error::DuplicateUnit(unit));
                continue;
            }
            match self.generate_class(spec) {
                Ok(class) => {
                    out.artifacts.push(class.declaration);
                    out.artifacts.push(class.definition);
                    registries.push(class.registry);
                }
                Err(error) => out.fail(unit, error),
            }
        }

        for spec in file.catalogs {
            let unit = spec.name.clone();
            if !claimed.insert(unit.clone()) {
                out.fail(unit.clone(), Error::DuplicateUnit(unit));
                continue;
            }
            let result = PropertyCatalog::register(spec)
                .map_err(Error::from)
                .and_then(|catalog| emit_properties(&catalog, &self.config));
            match result {
                Ok(artifact) => out.artifacts.push(artifact),
                Err(error) => out.fail(unit, error),
            }
        }

        for set in file.choices {
            if !claimed.insert(set.name.clone()) {
                out.fail(set.name.clone(), Error::DuplicateUnit(set.name));
                continue;
            }
            match emit_choices(&set, &self.config) {
                Ok(artifact) => out.artifacts.push(artifact),
                Err(error) => out.fail(set.name, error),
            }
        }

        let mut composer = DialogComposer::new(&self.bindings);
        for registry in &registries {
            composer.add_class(registry);
        }
        for desc in file.dialogs {
            if !claimed.insert(desc.class_name.clone()) {
                out.fail(desc.class_name.clone(), Error::DuplicateUnit(desc.class_name));
                continue;
            }
            let result = composer
                .compose(&desc)
                .map_err(Error::from)
                .and_then(|layout| emit_dialog(&layout, &self.config));
            match result {
                Ok(artifact) => out.artifacts.push(artifact),
                Err(error) => out.fail(desc.class_name, error),
            }
        }

        out
    }

    /// Load descriptor files, generate them and write `OUTPUT_FILE` into
    /// `out_dir`. Units that generated are written even when others failed.
    pub fn build_files<P: AsRef<Path>>(
        &self,
        files: &[P],
        out_dir: &Path,
    ) -> Result<BatchOutput, Error> {
        let mut merged = DescriptorFile::default();
        for file in files {
            merged.merge(load::from_path(file)?);
        }

        let output = self.generate_batch(merged);
        let path = out_dir.join(OUTPUT_FILE);
        fs::write(&path, output.render(&self.config))
            .map_err(|source| Error::Write { path, source })?;

        Ok(output)
    }
}
