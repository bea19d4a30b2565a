//! Core type definitions shared across the crate.

use indexmap::IndexMap;
use std::any::Any;
use std::sync::Arc;

use crate::error::EngineError;
use crate::naming::{NAMESPACE_SEPARATOR, demodulize, qualify};

/// A unit of behavior run against a module.
///
/// Parts and registrar entries carry fragments; running one "in the context
/// of" a module means calling it with that module.
pub type Fragment = Arc<dyn Fn(&mut Module) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a closure as a [`Fragment`].
pub fn fragment<F>(f: F) -> Fragment
where
    F: Fn(&mut Module) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Reference from a module to a part it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRef {
    pub key: String,
    /// Owning system key, `None` for a core part.
    pub system: Option<String>,
}

/// A symbolic target that parts and registrar hooks augment.
#[derive(Clone, Default)]
pub struct Module {
    name: String,
    base: Option<String>,
    capabilities: IndexMap<String, Arc<dyn Any + Send + Sync>>,
    parts: Vec<PartRef>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a module derived from `base`.
    pub fn derived(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: Some(base.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Declare that this module consumes a core part.
    pub fn part(mut self, key: impl Into<String>) -> Self {
        self.parts.push(PartRef {
            key: key.into(),
            system: None,
        });
        self
    }

    /// Declare that this module consumes a part owned by `system`.
    pub fn system_part(mut self, key: impl Into<String>, system: impl Into<String>) -> Self {
        self.parts.push(PartRef {
            key: key.into(),
            system: Some(system.into()),
        });
        self
    }

    /// Move the module under `namespace` unless its name is already qualified.
    pub(crate) fn within(mut self, namespace: &str) -> Self {
        if !self.name.contains(NAMESPACE_SEPARATOR) {
            self.name = qualify(namespace, &self.name);
        }
        self
    }

    pub fn part_refs(&self) -> &[PartRef] {
        &self.parts
    }

    /// Builder form of [`Module::define`].
    pub fn with<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.define(name, value);
        self
    }

    /// Add or replace a named capability.
    pub fn define<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) {
        self.capabilities.insert(name.into(), Arc::new(value));
    }

    /// Get a capability by name and type.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<&T> {
        self.capabilities
            .get(name)
            .and_then(|value| value.downcast_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Capability names in definition order.
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Run a fragment with this module as its context.
    pub fn exec(&mut self, fragment: &Fragment) -> anyhow::Result<()> {
        fragment(self)
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let capabilities: Vec<_> = self.capability_names().collect();
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("capabilities", &capabilities)
            .field("parts", &self.parts)
            .finish()
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Modules addressable by symbolic name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: IndexMap<String, Module>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module under its own name, replacing any previous one.
    pub fn insert(&mut self, module: Module) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Look a module up by name.
    ///
    /// An exact match wins; otherwise the first module (in insertion order)
    /// whose last namespace segment equals `name`, so `DevBox` finds
    /// `DevSystem::DevBox`.
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index_of(name).map(|index| &self.modules[index])
    }

    /// Mutable lookup, failing with [`EngineError::UnresolvedSymbol`].
    pub fn resolve_mut(&mut self, name: &str) -> Result<&mut Module, EngineError> {
        match self.index_of(name) {
            Some(index) => Ok(&mut self.modules[index]),
            None => Err(EngineError::unresolved(name)),
        }
    }

    pub(crate) fn get_index_mut(&mut self, index: usize) -> Option<&mut Module> {
        self.modules.get_index_mut(index).map(|(_, module)| module)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        if let Some(index) = self.modules.get_index_of(name) {
            return Some(index);
        }
        if name.contains(NAMESPACE_SEPARATOR) {
            return None;
        }
        self.modules
            .keys()
            .position(|qualified| demodulize(qualified) == name)
    }
}

impl Extend<Module> for ModuleTable {
    fn extend<I: IntoIterator<Item = Module>>(&mut self, iter: I) {
        for module in iter {
            self.insert(module);
        }
    }
}
