//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Config file formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a path, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Parse configuration text in the given format, without validating it
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(ConfigError::JsonError)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(ConfigError::YamlError)?,
        ConfigFormat::Toml => toml::from_str(content).map_err(ConfigError::TomlError)?,
    };
    Ok(config)
}

/// Load and validate configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let format = ConfigFormat::from_path(path);
    info!(path = %path.display(), format = format.as_str(), "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content, format)?;

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file directly inside `dir`.
///
/// Parent directories are not searched: job directories are created
/// relative to the directory the config was found in.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    debug!(dir = %dir.display(), "searching for config file");

    let found = config_file_names()
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file());

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!("no config file found"),
    }
    found
}
