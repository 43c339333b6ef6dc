//! Application configuration loading.
//!
//! Settings come from an optional TOML file, then environment overrides, then
//! command-line overrides. Every field has a default so an absent file is fine;
//! a file that exists but cannot be read or parsed is an error.

use crate::{
    core::{
        StorageKeys,
        book::{DEFAULT_LEGACY_STORAGE_KEY, DEFAULT_STORAGE_KEY},
    },
    entities::{RecurringType, View},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TASK_BUDDY_CONFIG";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASK_BUDDY_DATA_DIR";
/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "task-buddy.toml";

/// Settings for the task book and the terminal front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the stored blobs
    pub data_dir: PathBuf,
    /// View shown when none is requested (`day`, `week`, `month`)
    pub default_view: String,
    /// Refresh interval of `watch`, in seconds
    pub tick_seconds: u64,
    /// Key of the current-schema blob
    pub storage_key: String,
    /// Key of the legacy task list
    pub legacy_storage_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_view: RecurringType::Day.to_string(),
            tick_seconds: 1,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            legacy_storage_key: DEFAULT_LEGACY_STORAGE_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// The configured default view; unrecognized names fall back to `DAY`.
    #[must_use]
    pub fn view(&self) -> View {
        RecurringType::normalize(&self.default_view)
    }

    /// Store keys for the task book.
    #[must_use]
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys {
            current: self.storage_key.clone(),
            legacy: self.legacy_storage_key.clone(),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.tick_seconds == 0 {
            return Err(Error::Config {
                message: "tick_seconds must be at least 1".to_string(),
            });
        }
        if self.storage_key.trim().is_empty() || self.legacy_storage_key.trim().is_empty() {
            return Err(Error::Config {
                message: "storage keys cannot be empty".to_string(),
            });
        }
        if self.storage_key == self.legacy_storage_key {
            return Err(Error::Config {
                message: "storage_key and legacy_storage_key must differ".to_string(),
            });
        }
        Ok(self)
    }

    /// Applies environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            debug!(dir, "data directory overridden from environment");
            self.data_dir = PathBuf::from(dir);
        }
        self
    }
}

/// `<platform data dir>/task-buddy`, or `./data` when the platform has none.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from("data"), |d| d.join("task-buddy"))
}

/// Parses configuration text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse configuration: {e}"),
    })?;
    config.validate()
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or names unknown fields
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Resolves the full application configuration.
///
/// The file is `explicit_path` when given, else `$TASK_BUDDY_CONFIG`, else
/// `./task-buddy.toml` if it exists, else built-in defaults. `$TASK_BUDDY_DATA_DIR`
/// and then `data_dir_override` replace the data directory.
pub fn load_app_configuration(
    explicit_path: Option<&Path>,
    data_dir_override: Option<PathBuf>,
) -> Result<AppConfig> {
    let env_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let path = explicit_path.map(Path::to_path_buf).or(env_path).or_else(|| {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    });

    let config = match path {
        Some(p) => {
            let config = load_config(&p)?;
            info!(path = %p.display(), "loaded configuration file");
            config
        }
        None => AppConfig::default(),
    };

    let mut config = config.with_env_overrides(|name| std::env::var(name).ok());
    if let Some(dir) = data_dir_override {
        config.data_dir = dir;
    }
    Ok(config)
}
