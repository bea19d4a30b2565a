//! Error taxonomy for composition failures.

use std::path::PathBuf;

/// Failures raised while declaring, resolving and connecting systems.
///
/// None of these are transient. They all abort startup.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A declared system key has no entry in the system catalog.
    ///
    /// Carries only the key; the catalog lookup itself has no detail worth
    /// surfacing, so there is never an underlying source.
    #[error("FILE {key}_system not found in the system catalog")]
    SystemNotFound { key: String },

    /// A system was declared after the registry was bundled.
    #[error("locked: cannot declare system '{key}' after systems were bundled")]
    LockedRegistration { key: String },

    /// The engine has already bundled its systems.
    #[error("locked: systems were already bundled")]
    AlreadyBundled,

    /// A part or registrar target name did not resolve to a module.
    #[error("uninitialized constant {name}")]
    UnresolvedSymbol { name: String },

    /// A registrar entry uses a hook kind other than `insertion`.
    #[error("TODO: decide and implement system extension ({kind}_{target})")]
    UnimplementedRegistrarKind { kind: String, target: String },

    /// A fragment returned an error while running against a module.
    #[error("{context} failed: {source}")]
    Hook {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An ignore or collapse pattern is not a valid glob.
    #[error("invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Walking a pushed root failed.
    #[error("failed to scan '{}': {source}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The designated entry module does not carry a command capability.
    #[error("entry module '{module}' has no '{capability}' command")]
    MissingEntry { module: String, capability: String },
}

impl EngineError {
    pub(crate) fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedSymbol { name: name.into() }
    }

    pub(crate) fn hook(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Hook {
            context: context.into(),
            source: source.into(),
        }
    }
}
