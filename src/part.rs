//! Parts: extension points that modules customize.
//!
//! A part is owned either by the core namespace or by one system. Modules
//! list the parts they consume; connecting a part applies its payloads:
//!
//! - the `insertion` fragment runs against the consuming module itself;
//! - the `extension` fragment runs against a new `Extension` module that
//!   lives on the part definition, derived from [`PART_EXTENSION_BASE`].

use indexmap::IndexMap;
use std::time::Instant;
use tracing::debug;

use crate::error::EngineError;
use crate::naming::{part_type_name, qualify, system_type_name};
use crate::types::{Fragment, Module};

/// Base shared by every part `Extension` module.
pub const PART_EXTENSION_BASE: &str = "PartExtension";

/// Definition of a part and its optional payloads.
#[derive(Clone)]
pub struct PartDefinition {
    key: String,
    system: Option<String>,
    insertion: Option<Fragment>,
    extension: Option<Fragment>,
    extension_module: Option<Module>,
}

impl PartDefinition {
    /// A core-level part.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            system: None,
            insertion: None,
            extension: None,
            extension_module: None,
        }
    }

    /// A part owned by the system with the given key.
    pub fn for_system(key: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            ..Self::new(key)
        }
    }

    pub fn insertion(mut self, fragment: Fragment) -> Self {
        self.insertion = Some(fragment);
        self
    }

    pub fn extension(mut self, fragment: Fragment) -> Self {
        self.extension = Some(fragment);
        self
    }

    pub(crate) fn owned_by(mut self, system: &str) -> Self {
        self.system = Some(system.to_string());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// `GreetingPart` for a core part, `DevSystem::GreetingPart` for a part of `dev`.
    pub fn qualified_name(&self) -> String {
        qualified_part_name(&self.key, self.system.as_deref())
    }

    pub fn has_insertion(&self) -> bool {
        self.insertion.is_some()
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }

    /// The `Extension` module, once the part has been connected.
    pub fn extension_module(&self) -> Option<&Module> {
        self.extension_module.as_ref()
    }
}

impl std::fmt::Debug for PartDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartDefinition")
            .field("key", &self.key)
            .field("system", &self.system)
            .field("insertion", &self.insertion.is_some())
            .field("extension", &self.extension.is_some())
            .field("extension_module", &self.extension_module)
            .finish()
    }
}

pub(crate) fn qualified_part_name(key: &str, system: Option<&str>) -> String {
    match system {
        None => part_type_name(key),
        Some(system) => qualify(&system_type_name(system), &part_type_name(key)),
    }
}

/// Part definitions keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct PartTable {
    parts: IndexMap<String, PartDefinition>,
}

impl PartTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: PartDefinition) {
        self.parts.insert(part.qualified_name(), part);
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDefinition> {
        self.parts.values()
    }

    pub fn get(&self, key: &str, system: Option<&str>) -> Option<&PartDefinition> {
        self.parts.get(&qualified_part_name(key, system))
    }

    fn resolve_mut(
        &mut self,
        key: &str,
        system: Option<&str>,
    ) -> Result<&mut PartDefinition, EngineError> {
        let name = qualified_part_name(key, system);
        match self.parts.get_index_of(&name) {
            Some(index) => Ok(&mut self.parts[index]),
            None => Err(EngineError::unresolved(name)),
        }
    }
}

impl Extend<PartDefinition> for PartTable {
    fn extend<I: IntoIterator<Item = PartDefinition>>(&mut self, iter: I) {
        for part in iter {
            self.insert(part);
        }
    }
}

/// Connect the part `key` (core when `system` is `None`) to `target`.
pub fn connect_part(
    target: &mut Module,
    parts: &mut PartTable,
    key: &str,
    system: Option<&str>,
) -> Result<(), EngineError> {
    let t = Instant::now();
    let line = format!("CONNECTING PART {:>25}.part :{key}", target.name());
    debug!("{line}");

    let part = parts.resolve_mut(key, system)?;

    if let Some(insertion) = &part.insertion {
        target
            .exec(insertion)
            .map_err(|e| EngineError::hook(format!("{}.insertion", part.qualified_name()), e))?;
    }

    if let Some(extension) = &part.extension {
        let qualified = part.qualified_name();
        let mut module = Module::derived(qualify(&qualified, "Extension"), PART_EXTENSION_BASE);
        module
            .exec(extension)
            .map_err(|e| EngineError::hook(format!("{qualified}.extension"), e))?;
        part.extension_module = Some(module);
    }

    debug!("{line} takes {:.6}s", t.elapsed().as_secs_f64());
    Ok(())
}
