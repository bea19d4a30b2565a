//! The contract a pluggable system implements.

use anstyle::AnsiColor;
use std::path::PathBuf;
use std::sync::Arc;

use crate::logging::color_for;
use crate::part::PartDefinition;
use crate::registrar::Registrar;
use crate::types::Module;

/// A pluggable feature module.
///
/// Implementations are produced by factories registered in the
/// [`SystemCatalog`](crate::locator::SystemCatalog).
pub trait System: Send + Sync {
    /// Directory holding the system's sources. Pushed under the system's
    /// namespace when systems are bundled; a missing directory is skipped.
    fn source_root(&self) -> PathBuf;

    /// Ordered cross-system hooks.
    fn registrar(&self) -> Registrar {
        Registrar::new()
    }

    /// Modules this system contributes to the symbol table.
    fn modules(&self) -> Vec<Module> {
        Vec::new()
    }

    /// Parts this system owns.
    fn parts(&self) -> Vec<PartDefinition> {
        Vec::new()
    }

    fn log_color(&self, key: &str) -> AnsiColor {
        color_for(key)
    }
}

/// A declared system after resolution.
#[derive(Clone)]
pub struct ResolvedSystem {
    pub key: String,
    /// `DevSystem` for key `dev`.
    pub type_name: String,
    pub source_root: PathBuf,
    pub color: AnsiColor,
    pub implementation: Arc<dyn System>,
}

impl std::fmt::Debug for ResolvedSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSystem")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("source_root", &self.source_root)
            .field("color", &self.color)
            .finish()
    }
}
