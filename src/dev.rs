//! The built-in `dev` system.
//!
//! Contributes `DevSystem::DevBox`, whose `command` capability is the default
//! entry command:
//!
//! - `systems` (default) lists the bundled systems and their roots;
//! - `names` lists every name known to the active mappings;
//! - `reload` invalidates every mapping.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::composer::Registry;
use crate::engine::Command;
use crate::logging::{bold, paint};
use crate::system::System;
use crate::types::Module;

pub struct DevSystem {
    root: PathBuf,
}

impl DevSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Catalog factory for a `DevSystem` rooted at `root`.
    pub fn factory(root: PathBuf) -> impl Fn() -> Arc<dyn System> + Send + Sync + 'static {
        move || -> Arc<dyn System> { Arc::new(DevSystem::new(root.clone())) }
    }
}

impl System for DevSystem {
    fn source_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn modules(&self) -> Vec<Module> {
        vec![Module::new("DevBox").with("command", Command::new(dev_command))]
    }
}

fn dev_command(registry: &Registry, argv: &[String]) -> Result<()> {
    match argv.first().map(String::as_str) {
        None | Some("systems") => {
            for system in registry.systems() {
                info!(
                    "{} {}",
                    paint(&format!("{:<12}", system.key), system.color),
                    system.source_root.display()
                );
            }
        }
        Some("names") => {
            for mapping in registry.loaders().mappings() {
                for name in mapping.names()? {
                    info!("{name}");
                }
            }
        }
        Some("reload") => {
            registry.reload()?;
            info!("{}", bold("reloaded"));
        }
        Some(other) => warn!("Unknown command: {other}"),
    }
    Ok(())
}
