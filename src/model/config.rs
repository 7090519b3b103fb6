use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from pinnote.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub people: PeopleConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the notes service, e.g. `http://10.0.0.5:5000`.
    /// Deployment-specific, so there is no default.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// The closed name lists the widget offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeopleConfig {
    /// Display names offered in the "Created By" selector
    #[serde(default = "default_creators")]
    pub creators: Vec<String>,
    /// First-name handles recognised after `@` in titles
    #[serde(default = "default_mention_handles")]
    pub mention_handles: Vec<String>,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        PeopleConfig {
            creators: default_creators(),
            mention_handles: default_mention_handles(),
        }
    }
}

fn default_creators() -> Vec<String> {
    ["Mba Desi", "Vinka", "Ikbal", "Mas David", "Untung", "Imam"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_mention_handles() -> Vec<String> {
    ["Vinka", "Desi", "David", "Ikbal", "Imam", "Untung"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot (e.g. `background = "#000000"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `env_logger` filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file. The TUI only logs when this is set.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
