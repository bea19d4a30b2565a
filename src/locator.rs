use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::error::EngineError;
use crate::naming::system_unit_name;
use crate::system::System;

type SystemFactory = Box<dyn Fn() -> Arc<dyn System> + Send + Sync>;

/// Explicit table of loadable systems, keyed by unit name (`dev_system`).
///
/// Populated once at startup; the composer resolves declared keys against it.
#[derive(Default)]
pub struct SystemCatalog {
    factories: IndexMap<String, SystemFactory>,
}

impl SystemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `key`.
    pub fn register<F>(&mut self, key: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn System> + Send + Sync + 'static,
    {
        self.factories
            .insert(system_unit_name(key), Box::new(factory));
        self
    }

    /// Builder form of [`SystemCatalog::register`].
    pub fn with<F>(mut self, key: &str, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn System> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(&system_unit_name(key))
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories
            .keys()
            .filter_map(|unit| unit.strip_suffix("_system"))
    }

    /// Build the implementation bound to `key`.
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn System>, EngineError> {
        let t = Instant::now();
        let unit = system_unit_name(key);
        debug!("App.system :{unit}");

        let factory = self
            .factories
            .get(&unit)
            .ok_or_else(|| EngineError::SystemNotFound {
                key: key.to_string(),
            })?;
        let system = factory();

        debug!("App.system :{unit} takes {:.6}s", t.elapsed().as_secs_f64());
        Ok(system)
    }
}

impl std::fmt::Debug for SystemCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemCatalog")
            .field("units", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
