//! Active mappings and the reload lock.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::autoload::Mapping;
use crate::error::EngineError;

/// Every activated [`Mapping`], in activation order.
///
/// Shared through an `Arc` by whoever needs to reload. Reloads are
/// serialized: one reload, callback included, finishes before the next
/// begins.
#[derive(Debug, Default)]
pub struct Loaders {
    mappings: Mutex<Vec<Arc<Mapping>>>,
    reload_lock: Mutex<()>,
}

impl Loaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, mapping: Arc<Mapping>) {
        self.mappings.lock().push(mapping);
    }

    /// Snapshot of the active mappings.
    pub fn mappings(&self) -> Vec<Arc<Mapping>> {
        self.mappings.lock().clone()
    }

    pub fn reload(&self) -> anyhow::Result<bool> {
        self.reload_with(|| Ok(()))
    }

    /// Invalidate every mapping, then run `callback`, all under the reload lock.
    ///
    /// The lock is released on every exit path, including a failing callback.
    pub fn reload_with<F>(&self, callback: F) -> anyhow::Result<bool>
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        let _guard = self.reload_lock.lock();
        for mapping in self.mappings() {
            mapping.reload();
        }
        callback()?;
        Ok(true)
    }

    /// Derive the index of every mapping now. Returns the total name count.
    pub fn eager_load_all(&self) -> Result<usize, EngineError> {
        let mut total = 0;
        for mapping in self.mappings() {
            total += mapping.eager_load()?;
        }
        Ok(total)
    }
}
