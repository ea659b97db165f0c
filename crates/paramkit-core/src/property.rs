use crate::Constraints;
use bitflags::bitflags;
use std::any::Any;

bitflags! {
    ///
    /// PropFlags
    ///
    /// Host property status bits, passed through from descriptors.
    ///

    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct PropFlags: u32 {
        const HIDDEN = 1;
        const READ_ONLY = 1 << 1;
        const TRANSIENT = 1 << 2;
        const OUTPUT = 1 << 3;
        const NO_RECOMPUTE = 1 << 4;
        const NO_PERSIST = 1 << 5;
        const LOCK_DYNAMIC = 1 << 6;
    }
}

impl PropFlags {
    /// Parse a `|` or `,` separated list such as `"Hidden|ReadOnly"`.
    /// Names match case-insensitively with or without underscores.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut flags = Self::empty();

        for token in text.split(['|', ',']).map(str::trim).filter(|t| !t.is_empty()) {
            let wanted = squash(token);
            let (_, flag) = Self::all()
                .iter_names()
                .find(|(name, _)| squash(name) == wanted)
                .ok_or_else(|| format!("unknown property flag '{token}'"))?;

            flags |= flag;
        }

        Ok(flags)
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

///
/// PropertySpec
///
/// Static description of one persisted object property.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertySpec {
    pub index: usize,
    pub name: &'static str,
    pub type_tag: &'static str,
    pub doc: &'static str,
    pub flags: PropFlags,
    pub constraints: Option<Constraints>,
}

///
/// PropertyHost
///
/// Object-model side of persisted properties: something that can add a
/// typed property and find it again after a document reload.
///

pub trait PropertyHost {
    type Handle: Clone;

    fn add_property(
        &mut self,
        spec: &PropertySpec,
        category: &str,
        default: Box<dyn Any + Send>,
    ) -> Self::Handle;

    fn find_property(&self, name: &str) -> Option<Self::Handle>;

    fn bind_constraints(&mut self, _handle: &Self::Handle, _constraints: Constraints) {}
}

///
/// PropertyMap
///
/// Index-to-handle mapping held by a feature after registration.
///

#[derive(Clone, Debug)]
pub struct PropertyMap<H> {
    handles: Vec<Option<H>>,
}

impl<H: Clone> PropertyMap<H> {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            handles: vec![None; len],
        }
    }

    /// Add one property to the host and remember its handle.
    pub fn register<P>(
        &mut self,
        host: &mut P,
        spec: &PropertySpec,
        category: &str,
        default: Box<dyn Any + Send>,
    ) -> H
    where
        P: PropertyHost<Handle = H>,
    {
        let handle = host.add_property(spec, category, default);
        if let Some(constraints) = spec.constraints {
            host.bind_constraints(&handle, constraints);
        }
        self.bind(spec.index, handle.clone());

        handle
    }

    pub fn bind(&mut self, index: usize, handle: H) {
        if let Some(slot) = self.handles.get_mut(index) {
            *slot = Some(handle);
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&H> {
        self.handles.get(index).and_then(Option::as_ref)
    }

    /// Re-establish the mapping after the host restored a document.
    /// Returns the number of properties found.
    pub fn restore<P>(&mut self, host: &mut P, specs: &[&PropertySpec]) -> usize
    where
        P: PropertyHost<Handle = H>,
    {
        let mut found = 0;

        for spec in specs {
            match host.find_property(spec.name) {
                Some(handle) => {
                    if let Some(constraints) = spec.constraints {
                        host.bind_constraints(&handle, constraints);
                    }
                    self.bind(spec.index, handle);
                    found += 1;
                }
                None => {
                    tracing::warn!(property = spec.name, "property missing after restore");
                    if let Some(slot) = self.handles.get_mut(spec.index) {
                        *slot = None;
                    }
                }
            }
        }

        found
    }
}
