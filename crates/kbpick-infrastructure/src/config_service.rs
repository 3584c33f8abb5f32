//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` and applies `KBPICK_*` environment
//! overrides on top. A missing file means defaults.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use kbpick_core::config::AppConfig;
use kbpick_core::error::{KbPickError, Result};

use crate::paths::KbPickPaths;

pub const ENV_API_URL: &str = "KBPICK_API_URL";
pub const ENV_AUTH_URL: &str = "KBPICK_AUTH_URL";
pub const ENV_ANON_KEY: &str = "KBPICK_ANON_KEY";
pub const ENV_EMAIL: &str = "KBPICK_EMAIL";
pub const ENV_PASSWORD: &str = "KBPICK_PASSWORD";
pub const ENV_KB_ID: &str = "KBPICK_KB_ID";

/// Loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration; filled on first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &KbPickPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| KbPickError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self
                .config
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let env: HashMap<String, String> = std::env::vars().collect();
        let loaded = self.load(&env)?;

        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = None;
    }

    fn load(&self, env: &HashMap<String, String>) -> Result<AppConfig> {
        let mut config = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.path.display()
            );
            AppConfig::default()
        };
        apply_env_overrides(&mut config, env);
        Ok(config)
    }

    /// Writes `config` to the config file (used by `kbpick config init`).
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(config)?)?;
        self.invalidate_cache();
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn apply_env_overrides(config: &mut AppConfig, env: &HashMap<String, String>) {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(v) = get(ENV_API_URL) {
        config.api_url = v;
    }
    if let Some(v) = get(ENV_AUTH_URL) {
        config.auth_url = v;
    }
    if let Some(v) = get(ENV_ANON_KEY) {
        config.anon_key = v;
    }
    if let Some(v) = get(ENV_EMAIL) {
        config.email = Some(v);
    }
    if let Some(v) = get(ENV_PASSWORD) {
        config.password = Some(v);
    }
    if let Some(v) = get(ENV_KB_ID) {
        config.knowledge_base_id = Some(v);
    }
}
