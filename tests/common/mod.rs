#![allow(dead_code)]

use composable_app::loaders::Loaders;
use composable_app::{Composer, Module, PartDefinition, Registrar, System, SystemCatalog};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A system assembled from plain values.
#[derive(Clone, Default)]
pub struct TestSystem {
    pub root: PathBuf,
    pub registrar: Registrar,
    pub modules: Vec<Module>,
    pub parts: Vec<PartDefinition>,
}

impl TestSystem {
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl System for TestSystem {
    fn source_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn registrar(&self) -> Registrar {
        self.registrar.clone()
    }

    fn modules(&self) -> Vec<Module> {
        self.modules.clone()
    }

    fn parts(&self) -> Vec<PartDefinition> {
        self.parts.clone()
    }
}

pub fn catalog_with(systems: Vec<(&str, TestSystem)>) -> SystemCatalog {
    let mut catalog = SystemCatalog::new();
    for (key, system) in systems {
        catalog.register(key, move || -> Arc<dyn System> { Arc::new(system.clone()) });
    }
    catalog
}

pub fn composer_with(systems: Vec<(&str, TestSystem)>) -> Composer {
    Composer::new(Arc::new(catalog_with(systems)), Arc::new(Loaders::new()))
}

/// Create `relative` under `base` (with parents) and return its path.
pub fn create_dir(base: &Path, relative: &str) -> PathBuf {
    let path = base.join(relative);
    fs::create_dir_all(&path).unwrap();
    path
}

/// Create an empty file at `relative` under `base` (with parents).
pub fn touch(base: &Path, relative: &str) -> PathBuf {
    let path = base.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "").unwrap();
    path
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
