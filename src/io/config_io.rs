use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE: &str = "pinnote.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load configuration.
///
/// An explicit path must exist. Otherwise `pinnote.toml` in `dir` is used
/// when present, and built-in defaults when not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.is_file() {
                return Ok(AppConfig::default());
            }
            candidate
        }
    };
    read_config(&path)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply command-line overrides on top of the file
pub fn apply_overrides(config: &mut AppConfig, api_url: Option<&str>) {
    if let Some(url) = api_url {
        config.api.base_url = Some(url.to_string());
    }
}
