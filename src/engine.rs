//! Host-facing entry point.
//!
//! ```no_run
//! use composable_app::{EngineConfig, SystemCatalog};
//! use composable_app::engine::Engine;
//!
//! let mut engine = Engine::new(EngineConfig::default(), SystemCatalog::new());
//! engine.declare("dev").unwrap();
//! let argv: Vec<String> = std::env::args().skip(1).collect();
//! engine.run(&argv).unwrap();
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::autoload::{Mapping, MappingBuilder};
use crate::composer::{Composer, Registry, collapse_all};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::loaders::Loaders;
use crate::locator::SystemCatalog;
use crate::part::{PartDefinition, PartTable};
use crate::types::{Module, ModuleTable};

type CommandFn = dyn Fn(&Registry, &[String]) -> anyhow::Result<()> + Send + Sync;

/// A command that receives argv once composition is done.
///
/// Stored as a capability on the entry module.
#[derive(Clone)]
pub struct Command(Arc<CommandFn>);

impl Command {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Registry, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, registry: &Registry, argv: &[String]) -> anyhow::Result<()> {
        (self.0)(registry, argv)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Command")
    }
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: Arc<SystemCatalog>,
    loaders: Arc<Loaders>,
    core_modules: ModuleTable,
    core_parts: PartTable,
    declared: Vec<String>,
    modes: Vec<String>,
    core_mapping: Option<Arc<Mapping>>,
    locked: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, catalog: SystemCatalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            loaders: Arc::new(Loaders::new()),
            core_modules: ModuleTable::new(),
            core_parts: PartTable::new(),
            declared: Vec::new(),
            modes: Vec::new(),
            core_mapping: None,
            locked: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn loaders(&self) -> &Arc<Loaders> {
        &self.loaders
    }

    pub fn core_module(&mut self, module: Module) -> &mut Self {
        self.core_modules.insert(module);
        self
    }

    pub fn core_part(&mut self, part: PartDefinition) -> &mut Self {
        self.core_parts.insert(part);
        self
    }

    /// Declare a system in addition to the configured ones.
    ///
    /// Fails once the engine has bundled.
    pub fn declare(&mut self, key: impl Into<String>) -> Result<&mut Self, EngineError> {
        let key = key.into();
        if self.locked {
            return Err(EngineError::LockedRegistration { key });
        }
        self.declared.push(key);
        Ok(self)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Declare a mode the application supports.
    pub fn mode(&mut self, mode: impl Into<String>) -> &mut Self {
        self.modes.push(mode.into());
        self
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    /// The configured mode, if any.
    pub fn current_mode(&self) -> Option<&str> {
        self.config.mode.as_deref()
    }

    /// Activate the core mapping when a core root is configured.
    /// Does nothing if the core mapping is already active.
    pub fn setup_core(&mut self) -> Result<(), EngineError> {
        if self.locked {
            return Err(EngineError::AlreadyBundled);
        }
        if self.core_mapping.is_some() {
            return Ok(());
        }
        let Some(root) = self.config.core_root() else {
            return Ok(());
        };
        let mut builder = MappingBuilder::new(self.config.core.namespace.clone());
        // ORDER MATTERS: IGNORE, COLLAPSE, PUSH
        builder
            .collapse(collapse_all(&root))
            .push(&root, self.config.core.namespace.clone());
        self.core_mapping = Some(builder.activate(&self.loaders)?);
        Ok(())
    }

    /// A draft composer holding the core modules and every declared system.
    pub fn composer(&self) -> Composer {
        let mut composer = Composer::new(self.catalog.clone(), self.loaders.clone());
        for module in self.core_modules.iter() {
            composer.module(module.clone());
        }
        for part in self.core_parts.iter() {
            composer.part(part.clone());
        }
        if let Some(mapping) = &self.core_mapping {
            composer.core_mapping(mapping.clone());
        }
        for key in self.config.systems.iter().chain(&self.declared) {
            composer.declare(key.clone());
        }
        composer
    }

    /// Bundle every declared system. Locks the engine, even if bundling fails.
    pub fn bundle(&mut self) -> Result<Registry, EngineError> {
        if self.locked {
            return Err(EngineError::AlreadyBundled);
        }
        self.locked = true;
        self.composer()
            .bundle(&self.config.app.root, &self.config.app.name)
    }

    /// Set up the core, bundle every system, then hand `argv` to the entry command.
    pub fn run(&mut self, argv: &[String]) -> anyhow::Result<Registry> {
        self.setup_core()?;
        let registry = self.bundle()?;
        if let Some(mode) = self.current_mode() {
            debug!("mode {mode} (declared: {:?})", self.modes);
        }

        println!();
        self.dispatch(&registry, argv)?;
        println!();

        Ok(registry)
    }

    fn dispatch(&self, registry: &Registry, argv: &[String]) -> anyhow::Result<()> {
        let entry = &self.config.entry;
        let module = registry
            .module(&entry.module)
            .ok_or_else(|| EngineError::UnresolvedSymbol {
                name: entry.module.clone(),
            })?;
        let command = module
            .get::<Command>(&entry.capability)
            .ok_or_else(|| EngineError::MissingEntry {
                module: entry.module.clone(),
                capability: entry.capability.clone(),
            })?;
        command.call(registry, argv)
    }
}
