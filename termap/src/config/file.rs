//! INI configuration file loading.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::MapConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl Display, reason: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Default configuration file location: `~/.termap/config.ini`.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".termap").join("config.ini"))
}

impl MapConfig {
    /// Load from the default location, falling back to defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::default().apply_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::default().apply_ini(&ini)
    }

    fn apply_ini(mut self, ini: &Ini) -> Result<Self, ConfigError> {
        if let Some(v) = read(ini, "map", "initial_lat")? {
            self.initial_lat = v;
        }
        if let Some(v) = read(ini, "map", "initial_lon")? {
            self.initial_lon = v;
        }
        if let Some(v) = read(ini, "map", "initial_zoom")? {
            self.initial_zoom = Some(v);
        }
        if let Some(v) = read(ini, "map", "max_zoom")? {
            self.max_zoom = v;
        }
        if let Some(v) = read(ini, "map", "zoom_step")? {
            self.zoom_step = v;
        }

        if let Some(v) = read::<String>(ini, "source", "url")? {
            self.source = v;
        }
        if let Some(v) = read(ini, "source", "timeout_secs")? {
            self.http_timeout_secs = v;
        }

        if let Some(v) = read(ini, "cache", "size")? {
            self.cache_size = v;
        }

        if let Some(v) = read_bool(ini, "display", "braille")? {
            self.use_braille = v;
        }
        if let Some(v) = read(ini, "display", "tile_range")? {
            self.tile_range = v;
        }
        if let Some(v) = read(ini, "display", "project_size")? {
            self.project_size = v;
        }
        if let Some(v) = read(ini, "display", "width")? {
            self.width = Some(v);
        }
        if let Some(v) = read(ini, "display", "height")? {
            self.height = Some(v);
        }

        if let Some(v) = read_bool(ini, "mouse", "click_to_center")? {
            self.mouse.click_to_center = v;
        }
        if let Some(v) = read_bool(ini, "mouse", "drag")? {
            self.mouse.drag = v;
        }
        if let Some(v) = read_bool(ini, "mouse", "zoom")? {
            self.mouse.zoom = v;
        }

        if let Some(v) = read::<String>(ini, "logging", "file")? {
            self.log_file = Some(PathBuf::from(v));
        }

        self.validate()?;
        Ok(self)
    }
}

/// Reads `section.key`; a missing or empty value is `None`.
fn read<T>(ini: &Ini, section: &str, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    let Some(raw) = raw_value(ini, section, key) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| {
        ConfigError::invalid(&format!("{}.{}", section, key), raw, "could not be parsed")
    })
}

fn read_bool(ini: &Ini, section: &str, key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = raw_value(ini, section, key) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Some(true)),
        "false" | "no" | "off" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::invalid(
            &format!("{}.{}", section, key),
            raw,
            "expected true or false",
        )),
    }
}

fn raw_value<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
