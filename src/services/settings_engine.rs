// IR Hub Settings Engine
// Loads, saves and updates service settings.
// Settings are stored as a flat JSON file; a few values can be overridden from the environment.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::types::errors::SettingsError;
use crate::types::settings::ServiceSettings;

/// Environment variable naming the directory that holds the database file.
pub const DATA_DIR_ENV: &str = "IRHUB_DATA_DIR";
/// Environment variable overriding the index page size.
pub const PAGE_SIZE_ENV: &str = "IRHUB_PAGE_SIZE";
/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "IRHUB_CONFIG";

const CONFIG_FILE_NOUN: &str = "settings file";

/// Load, persist and update the service settings.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServiceSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServiceSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// JSON-file backed settings with environment overrides.
pub struct SettingsEngine {
    config_path: String,
    settings: ServiceSettings,
}

impl SettingsEngine {
    /// Settings file at `path_override`, else `$IRHUB_CONFIG`, else
    /// `irhub.json` in the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| "irhub.json".to_string());

        Self {
            config_path,
            settings: ServiceSettings::default(),
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides resolved through `lookup`.
    ///
    /// `IRHUB_DATA_DIR` relocates the database file into that directory while
    /// keeping its file name; `IRHUB_PAGE_SIZE` must be a positive integer.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            let file_name = Path::new(&self.settings.database_path)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "irhub.db".into());
            self.settings.database_path = PathBuf::from(dir)
                .join(file_name)
                .to_string_lossy()
                .to_string();
            debug!(path = %self.settings.database_path, "database path overridden from environment");
        }

        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            let size: i64 = raw.trim().parse().map_err(|_| {
                SettingsError::InvalidValue(format!("{} must be an integer, got '{}'", PAGE_SIZE_ENV, raw))
            })?;
            if size < 1 {
                return Err(SettingsError::InvalidValue(format!(
                    "{} must be at least 1, got {}",
                    PAGE_SIZE_ENV, size
                )));
            }
            self.settings.page_size = size;
        }

        Ok(())
    }

    fn validate(settings: &ServiceSettings) -> Result<(), SettingsError> {
        if settings.page_size < 1 {
            return Err(SettingsError::InvalidValue(format!(
                "page_size must be at least 1, got {}",
                settings.page_size
            )));
        }
        if settings.database_path.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "database_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn io_error(action: &str, e: std::io::Error) -> SettingsError {
    SettingsError::IoError(format!("{} {}: {}", action, CONFIG_FILE_NOUN, e))
}

fn json_error(action: &str, e: serde_json::Error) -> SettingsError {
    SettingsError::SerializationError(format!("{} {}: {}", action, CONFIG_FILE_NOUN, e))
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the JSON settings file. Missing keys take their defaults and a
    /// missing file means all defaults.
    fn load(&mut self) -> Result<ServiceSettings, SettingsError> {
        let settings = match fs::read_to_string(&self.config_path) {
            Ok(raw) => serde_json::from_str::<ServiceSettings>(&raw)
                .map_err(|e| json_error("cannot parse", e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.config_path, "no settings file, using defaults");
                ServiceSettings::default()
            }
            Err(e) => return Err(io_error("cannot read", e)),
        };
        Self::validate(&settings)?;

        info!(path = %self.config_path, page_size = settings.page_size, "settings loaded");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes the current settings as pretty JSON, creating the parent directory.
    fn save(&self) -> Result<(), SettingsError> {
        let target = Path::new(&self.config_path);
        match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| io_error("cannot create directory for", e))?
            }
            _ => {}
        }

        let body = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| json_error("cannot encode", e))?;
        fs::write(target, body).map_err(|e| io_error("cannot write", e))
    }

    fn get_settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Replaces one top-level setting and persists the result.
    ///
    /// The candidate is decoded as a whole `ServiceSettings`, so a value of the
    /// wrong JSON type (a string for `page_size`) is rejected.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let mut candidate = serde_json::to_value(&self.settings)
            .map_err(|e| json_error("cannot encode", e))?;

        let slot = candidate
            .as_object_mut()
            .and_then(|fields| fields.get_mut(key))
            .ok_or_else(|| SettingsError::InvalidKey(format!("unknown setting '{}'", key)))?;
        *slot = value;

        let updated: ServiceSettings = serde_json::from_value(candidate)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        Self::validate(&updated)?;

        self.settings = updated;
        self.save()?;
        info!(key, "setting updated");
        Ok(())
    }

    /// Restores the defaults and persists them.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ServiceSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
