//! Ordered cross-system hooks.
//!
//! Each system keeps a registrar: a list of `(hook, fragment)` entries such
//! as `insertion_DevBox`. Connecting a system replays the list exactly in
//! declaration order.

use std::time::Instant;
use tracing::info;

use crate::error::EngineError;
use crate::logging::{bold, paint};
use crate::naming::{lpartition, system_type_name};
use crate::system::System;
use crate::types::{Fragment, ModuleTable};

/// The only implemented hook kind.
pub const INSERTION: &str = "insertion";

#[derive(Clone)]
pub struct RegistrarEntry {
    hook: String,
    fragment: Fragment,
}

impl RegistrarEntry {
    pub fn hook(&self) -> &str {
        &self.hook
    }

    /// `(reg_type, reg_target)`, split at the first underscore.
    pub fn split(&self) -> (&str, &str) {
        lpartition(&self.hook)
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }
}

impl std::fmt::Debug for RegistrarEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrarEntry")
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registrar {
    entries: Vec<RegistrarEntry>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an `insertion_<target>` entry.
    pub fn insertion(self, target: &str, fragment: Fragment) -> Self {
        self.entry(format!("{INSERTION}_{target}"), fragment)
    }

    /// Append an entry with a raw hook descriptor.
    pub fn entry(mut self, hook: impl Into<String>, fragment: Fragment) -> Self {
        self.entries.push(RegistrarEntry {
            hook: hook.into(),
            fragment,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistrarEntry> {
        self.entries.iter()
    }
}

/// Replay the registrar of `system` against `modules`.
///
/// Returns the number of entries processed. Stops at the first failure.
pub fn connect_system(
    key: &str,
    system: &dyn System,
    modules: &mut ModuleTable,
) -> Result<usize, EngineError> {
    let t = Instant::now();
    let color = system.log_color(key);
    let system_name = paint(&system_type_name(key), color);

    let registrar = system.registrar();
    let mut registrar_index = 0;
    for entry in registrar.iter() {
        let (reg_type, reg_target) = entry.split();
        registrar_index += 1;

        let target = modules.resolve_mut(reg_target)?;

        if reg_type == INSERTION {
            target
                .exec(entry.fragment())
                .map_err(|e| EngineError::hook(format!("{key} {}", entry.hook()), e))?;
        } else {
            return Err(EngineError::UnimplementedRegistrarKind {
                kind: reg_type.to_string(),
                target: reg_target.to_string(),
            });
        }

        info!(
            "{}",
            bold(&format!(
                "CONNECTING SYSTEM PART          {system_name}.{reg_type} {target}"
            ))
        );
    }

    info!(
        "{}",
        bold(&format!(
            "CONNECTING SYSTEM - {:.6}s for {system_name} to connect to {registrar_index} system parts",
            t.elapsed().as_secs_f64()
        ))
    );
    Ok(registrar_index)
}
