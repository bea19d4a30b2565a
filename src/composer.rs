//! Declaring and bundling systems.
//!
//! A [`Composer`] collects system declarations. [`Composer::bundle`] consumes
//! it and returns the immutable [`Registry`], so nothing can be declared
//! once composition has run.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::autoload::{Mapping, MappingBuilder, TOP_LEVEL};
use crate::error::EngineError;
use crate::loaders::Loaders;
use crate::locator::SystemCatalog;
use crate::naming::system_type_name;
use crate::part::{PartDefinition, PartTable, connect_part};
use crate::registrar::connect_system;
use crate::system::{ResolvedSystem, System};
use crate::types::{Module, ModuleTable};

/// Pattern collapsing every directory beneath `dir`.
pub fn collapse_all(dir: &Path) -> String {
    format!("{}/**/*", globset::escape(&dir.to_string_lossy()))
}

/// Draft state: systems can still be declared.
pub struct Composer {
    catalog: Arc<SystemCatalog>,
    loaders: Arc<Loaders>,
    modules: ModuleTable,
    parts: PartTable,
    declared: Vec<String>,
    core_mapping: Option<Arc<Mapping>>,
}

impl Composer {
    pub fn new(catalog: Arc<SystemCatalog>, loaders: Arc<Loaders>) -> Self {
        Self {
            catalog,
            loaders,
            modules: ModuleTable::new(),
            parts: PartTable::new(),
            declared: Vec::new(),
            core_mapping: None,
        }
    }

    /// Add a core module.
    pub fn module(&mut self, module: Module) -> &mut Self {
        self.modules.insert(module);
        self
    }

    /// Add a core part.
    pub fn part(&mut self, part: PartDefinition) -> &mut Self {
        self.parts.insert(part);
        self
    }

    pub(crate) fn core_mapping(&mut self, mapping: Arc<Mapping>) -> &mut Self {
        self.core_mapping = Some(mapping);
        self
    }

    /// Declare a system. Declaration order drives composition order;
    /// declaring a key twice keeps its first position.
    pub fn declare(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        if !self.declared.contains(&key) {
            self.declared.push(key);
        }
        self
    }

    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    pub fn is_locked(&self) -> bool {
        false
    }

    /// Resolve, map and connect every declared system.
    ///
    /// Systems are mapped in declaration order, then the application's own
    /// sources at `<app_root>/<app_name>` when that directory exists.
    pub fn bundle(self, app_root: &Path, app_name: &str) -> Result<Registry, EngineError> {
        let Composer {
            catalog,
            loaders,
            mut modules,
            mut parts,
            declared,
            core_mapping,
        } = self;

        let mut systems = IndexMap::new();
        for key in declared {
            let implementation = catalog.resolve(&key)?;
            let system = ResolvedSystem {
                type_name: system_type_name(&key),
                source_root: implementation.source_root(),
                color: implementation.log_color(&key),
                implementation,
                key: key.clone(),
            };
            systems.insert(key, system);
        }

        let mut builder = MappingBuilder::new("systems");
        for system in systems.values() {
            builder
                .collapse(collapse_all(&system.source_root))
                .push(&system.source_root, system.type_name.clone());
        }
        let app_dir = app_root.join(app_name);
        builder
            .collapse(collapse_all(&app_dir))
            .push(&app_dir, TOP_LEVEL);
        let mapping = builder.activate(&loaders)?;

        for system in systems.values() {
            let namespace = &system.type_name;
            modules.extend(
                system
                    .implementation
                    .modules()
                    .into_iter()
                    .map(|module| module.within(namespace)),
            );
            parts.extend(
                system
                    .implementation
                    .parts()
                    .into_iter()
                    .map(|part| part.owned_by(&system.key)),
            );
        }

        for index in 0..modules.len() {
            let Some(module) = modules.get_index_mut(index) else {
                continue;
            };
            let part_refs = module.part_refs().to_vec();
            for part_ref in part_refs {
                connect_part(module, &mut parts, &part_ref.key, part_ref.system.as_deref())?;
            }
        }

        for system in systems.values() {
            connect_system(&system.key, system.implementation.as_ref(), &mut modules)?;
        }

        debug!("bundled {} systems", systems.len());
        Ok(Registry {
            systems,
            modules,
            parts,
            mapping,
            core_mapping,
            loaders,
            app_dir,
        })
    }
}

/// Ready state: the frozen result of [`Composer::bundle`].
#[derive(Debug)]
pub struct Registry {
    systems: IndexMap<String, ResolvedSystem>,
    modules: ModuleTable,
    parts: PartTable,
    mapping: Arc<Mapping>,
    core_mapping: Option<Arc<Mapping>>,
    loaders: Arc<Loaders>,
    app_dir: PathBuf,
}

impl Registry {
    /// Always fails: the registry is locked once bundled.
    pub fn declare(&self, key: &str) -> Result<(), EngineError> {
        Err(EngineError::LockedRegistration {
            key: key.to_string(),
        })
    }

    pub fn is_locked(&self) -> bool {
        true
    }

    /// Implementation bound to `key`.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn System>> {
        self.systems.get(key).map(|system| &system.implementation)
    }

    pub fn system(&self, key: &str) -> Option<&ResolvedSystem> {
        self.systems.get(key)
    }

    /// Systems in declaration order.
    pub fn systems(&self) -> impl Iterator<Item = &ResolvedSystem> {
        self.systems.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.systems.keys().map(String::as_str)
    }

    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn parts(&self) -> &PartTable {
        &self.parts
    }

    pub fn part(&self, key: &str, system: Option<&str>) -> Option<&PartDefinition> {
        self.parts.get(key, system)
    }

    /// The mapping spanning every system root and the application root.
    pub fn mapping(&self) -> &Arc<Mapping> {
        &self.mapping
    }

    pub fn core_mapping(&self) -> Option<&Arc<Mapping>> {
        self.core_mapping.as_ref()
    }

    pub fn loaders(&self) -> &Arc<Loaders> {
        &self.loaders
    }

    /// `<app_root>/<app_name>`, whether or not it exists.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn reload(&self) -> anyhow::Result<bool> {
        self.loaders.reload()
    }

    pub fn reload_with<F>(&self, callback: F) -> anyhow::Result<bool>
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        self.loaders.reload_with(callback)
    }
}
