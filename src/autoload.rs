//! Lazy namespace-to-directory mappings.
//!
//! A mapping is configured with three kinds of directives which are always
//! applied in the same order, whatever order they were given in:
//!
//! 1. **ignore** - paths matching these patterns are never indexed;
//! 2. **collapse** - directories matching these patterns add no namespace
//!    segment;
//! 3. **push** - a root directory is bound to a namespace.
//!
//! Collapse and push both rely on the reduced tree that ignore leaves behind,
//! so the order changes which names land under which namespace.
//!
//! Nothing is read from disk at activation. The name index is derived on the
//! first lookup and dropped again by [`Mapping::reload`].

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::EngineError;
use crate::loaders::Loaders;
use crate::naming::{camelize, qualify};

/// Namespace of the application's own sources.
pub const TOP_LEVEL: &str = "";

const DEFAULT_EXTENSION: &str = "rs";

/// A root directory bound to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub path: PathBuf,
    pub namespace: String,
}

/// One configuration step, as applied at activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Ignore(String),
    Collapse(String),
    Push(Root),
}

/// Collects directives for a new mapping.
#[derive(Debug)]
pub struct MappingBuilder {
    tag: String,
    extension: String,
    ignores: Vec<String>,
    collapses: Vec<String>,
    roots: Vec<Root>,
}

impl MappingBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            ignores: Vec::new(),
            collapses: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// File extension of indexed sources (without the dot).
    pub fn extension(&mut self, extension: impl Into<String>) -> &mut Self {
        self.extension = extension.into();
        self
    }

    pub fn ignore(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.ignores.push(pattern.into());
        self
    }

    pub fn collapse(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.collapses.push(pattern.into());
        self
    }

    /// Bind `root` to `namespace`. Does nothing if `root` is not a directory.
    pub fn push(&mut self, root: impl Into<PathBuf>, namespace: impl Into<String>) -> &mut Self {
        let path = root.into();
        if !path.is_dir() {
            debug!(
                "{}: skipping missing directory {}",
                self.tag,
                path.display()
            );
            return self;
        }
        self.roots.push(Root {
            path,
            namespace: namespace.into(),
        });
        self
    }

    /// Directives in application order.
    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.ignores, &self.collapses, &self.roots)
    }

    /// Finalize the mapping and register it with `loaders`.
    pub fn activate(self, loaders: &Loaders) -> Result<Arc<Mapping>, EngineError> {
        let ignore = build_glob_set(&self.ignores)?;
        let collapse = build_glob_set(&self.collapses)?;

        for root in &self.roots {
            debug!(
                "{}: push {} as {}",
                self.tag,
                root.path.display(),
                if root.namespace.is_empty() {
                    "<top level>"
                } else {
                    root.namespace.as_str()
                }
            );
        }

        let mapping = Arc::new(Mapping {
            tag: self.tag,
            extension: self.extension,
            ignores: self.ignores,
            collapses: self.collapses,
            roots: self.roots,
            ignore,
            collapse,
            index: RwLock::new(None),
            generation: AtomicU64::new(0),
        });
        loaders.register(mapping.clone());
        Ok(mapping)
    }
}

fn directives(ignores: &[String], collapses: &[String], roots: &[Root]) -> Vec<Directive> {
    ignores
        .iter()
        .cloned()
        .map(Directive::Ignore)
        .chain(collapses.iter().cloned().map(Directive::Collapse))
        .chain(roots.iter().cloned().map(Directive::Push))
        .collect()
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, EngineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| EngineError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| EngineError::Pattern {
        pattern: patterns.join(", "),
        source,
    })
}

type NameIndex = IndexMap<String, PathBuf>;

/// An activated mapping.
pub struct Mapping {
    tag: String,
    extension: String,
    ignores: Vec<String>,
    collapses: Vec<String>,
    roots: Vec<Root>,
    ignore: GlobSet,
    collapse: GlobSet,
    index: RwLock<Option<Arc<NameIndex>>>,
    generation: AtomicU64,
}

impl Mapping {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Pushed roots, in push order.
    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.ignores, &self.collapses, &self.roots)
    }

    /// Source file for a symbolic name such as `DevSystem::DevBox`.
    pub fn lookup(&self, name: &str) -> Result<Option<PathBuf>, EngineError> {
        Ok(self.index()?.get(name).cloned())
    }

    /// Every known name, in discovery order.
    pub fn names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.index()?.keys().cloned().collect())
    }

    /// Derive the index now instead of on first lookup. Returns the name count.
    pub fn eager_load(&self) -> Result<usize, EngineError> {
        Ok(self.index()?.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.index.read().is_some()
    }

    /// Number of times this mapping has been reloaded.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Forget every derived binding. The next lookup re-reads the roots.
    pub fn reload(&self) {
        *self.index.write() = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("{}: reloaded", self.tag);
    }

    fn index(&self) -> Result<Arc<NameIndex>, EngineError> {
        if let Some(index) = self.index.read().as_ref() {
            return Ok(index.clone());
        }
        let mut slot = self.index.write();
        if let Some(index) = slot.as_ref() {
            return Ok(index.clone());
        }
        let index = Arc::new(self.scan()?);
        *slot = Some(index.clone());
        Ok(index)
    }

    fn scan(&self) -> Result<NameIndex, EngineError> {
        let mut index = NameIndex::new();
        for root in &self.roots {
            let walker = WalkDir::new(&root.path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !self.ignore.is_match(entry.path()));
            for entry in walker {
                let entry = entry.map_err(|source| EngineError::Scan {
                    root: root.path.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                    continue;
                }
                if let Some(name) = self.name_for(root, path) {
                    index.entry(name).or_insert_with(|| path.to_path_buf());
                }
            }
        }
        debug!("{}: indexed {} names", self.tag, index.len());
        Ok(index)
    }

    fn name_for(&self, root: &Root, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&root.path).ok()?;
        let stem = relative.file_stem()?.to_str()?;

        let mut segments = Vec::new();
        let mut dir = root.path.clone();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                let segment = component.as_os_str().to_str()?;
                dir.push(segment);
                if !self.collapse.is_match(&dir) {
                    segments.push(camelize(segment));
                }
            }
        }
        segments.push(camelize(stem));

        Some(qualify(&root.namespace, &segments.join("::")))
    }
}

impl std::fmt::Debug for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapping")
            .field("tag", &self.tag)
            .field("directives", &self.directives())
            .field("loaded", &self.is_loaded())
            .field("generation", &self.generation())
            .finish()
    }
}
