use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration, usually read from a TOML file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enables verbose diagnostics.
    pub verbose: bool,
    /// Mode the application runs in.
    pub mode: Option<String>,
    /// Systems to declare, in order.
    pub systems: Vec<String>,
    pub app: AppConfig,
    pub core: CoreConfig,
    pub entry: EntryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name; its sources live under `<root>/<name>`.
    pub name: String,
    pub root: PathBuf,
    /// Directory holding built-in system sources, relative to `root`.
    pub lib: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub namespace: String,
    /// Core sources, relative to the application root. No core mapping without it.
    pub root: Option<PathBuf>,
}

/// Module and capability holding the command that receives argv.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub module: String,
    pub capability: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            root: PathBuf::from("."),
            lib: PathBuf::from("lib"),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            namespace: "Core".to_string(),
            root: None,
        }
    }
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            module: "DevBox".to_string(),
            capability: "command".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file. A relative `app.root` is resolved against
    /// the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if config.app.root.is_relative()
            && let Some(base) = path.parent()
        {
            config.app.root = base.join(&config.app.root);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.app.name.is_empty() {
            return Err(anyhow::anyhow!("app.name must not be empty"));
        }
        if let Some(key) = config.systems.iter().find(|key| key.is_empty()) {
            return Err(anyhow::anyhow!("Invalid system key: '{key}'"));
        }
        Ok(config)
    }

    /// `<app.root>/<app.name>`.
    pub fn app_dir(&self) -> PathBuf {
        self.app.root.join(&self.app.name)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.app.root.join(&self.app.lib)
    }

    pub fn core_root(&self) -> Option<PathBuf> {
        self.core.root.as_ref().map(|root| self.app.root.join(root))
    }
}
