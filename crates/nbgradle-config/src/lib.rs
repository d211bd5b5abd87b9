//! Application-wide configuration of the Gradle integration.
//!
//! The configuration is read from TOML; every section and key is optional. A process-wide
//! "current" configuration is consulted by components that depend on global settings (for example
//! classpath construction); tests override it with [`with_global_config`].

use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::{ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, subscriber, with_captured_logs, LoggingConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classpath: ClasspathConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClasspathConfig {
    /// Replace jar dependencies with the class directories of opened projects building a jar of
    /// the same file name.
    #[serde(default = "ClasspathConfig::default_detect_by_jar_name")]
    pub detect_project_dependencies_by_jar_name: bool,
}

impl ClasspathConfig {
    fn default_detect_by_jar_name() -> bool {
        true
    }
}

impl Default for ClasspathConfig {
    fn default() -> Self {
        Self {
            detect_project_dependencies_by_jar_name: Self::default_detect_by_jar_name(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl GlobalConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<Arc<GlobalConfig>>> = OnceLock::new();
static GLOBAL_CONFIG_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn global_config_cell() -> &'static RwLock<Arc<GlobalConfig>> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(Arc::new(GlobalConfig::default())))
}

fn global_config_lock() -> &'static ReentrantMutex<()> {
    GLOBAL_CONFIG_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// The configuration currently in effect.
pub fn global_config() -> Arc<GlobalConfig> {
    global_config_cell().read().clone()
}

/// Replaces the configuration in effect, returning the previous one.
pub fn set_global_config(config: GlobalConfig) -> Arc<GlobalConfig> {
    std::mem::replace(&mut *global_config_cell().write(), Arc::new(config))
}

struct RestoreGlobalConfig(Option<Arc<GlobalConfig>>);

impl Drop for RestoreGlobalConfig {
    fn drop(&mut self) {
        if let Some(previous) = self.0.take() {
            *global_config_cell().write() = previous;
        }
    }
}

/// Runs `f` with `config` in effect and restores the previous configuration afterwards, even if
/// `f` panics.
///
/// Calls are serialized process-wide (re-entrantly), so concurrently running tests cannot observe
/// each other's overrides as long as they all go through this function.
pub fn with_global_config<R>(config: GlobalConfig, f: impl FnOnce() -> R) -> R {
    let _guard = global_config_lock().lock();
    let _restore = RestoreGlobalConfig(Some(set_global_config(config)));
    f()
}
