use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_TEST_INTERVAL, DEFAULT_TEST_URL};
use crate::models::{ClashOptions, GroupDef, GroupType, OverrideConfig, SubconverterTarget};

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings are neither valid YAML ({yaml}) nor valid TOML ({toml})")]
    Format { yaml: String, toml: String },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Settings structure to hold global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Server
    pub listen_address: String,
    pub listen_port: u16,
    pub max_concur_threads: usize,

    /// Target used when a request does not name one
    pub default_target: String,

    // Subscription fetching
    pub fetch_timeout_secs: u64,
    pub max_download_size: usize,

    /// Overrides applied to every conversion
    pub overrides: OverrideConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 25500,
            max_concur_threads: 4,
            default_target: SubconverterTarget::Clash.as_str().to_string(),
            fetch_timeout_secs: 15,
            max_download_size: 8 * 1024 * 1024,
            overrides: default_overrides(),
        }
    }
}

/// Stock overrides: a url-test group of US nodes for AI services, and the
/// keyword rules routing those services to it.
pub fn default_overrides() -> OverrideConfig {
    let mut ai = GroupDef::new("AI Services", GroupType::UrlTest);
    ai.url = Some(DEFAULT_TEST_URL.to_string());
    ai.interval = Some(DEFAULT_TEST_INTERVAL);
    ai.include_all = true;
    ai.filter = Some("(?i)美国|US|LA".to_string());

    let keywords = [
        "gemini",
        "youtube",
        "google",
        "chatgpt",
        "livekit",
        "openai",
        "claude",
        "anthropic",
        "openrouter",
    ];
    let suffixes = ["chat.com", "sora.com"];
    let rules = keywords
        .iter()
        .map(|keyword| format!("DOMAIN-KEYWORD,{},AI Services", keyword))
        .chain(
            suffixes
                .iter()
                .map(|suffix| format!("DOMAIN-SUFFIX,{},AI Services", suffix)),
        )
        .collect();

    OverrideConfig {
        clash_options: ClashOptions {
            log_level: Some("info".to_string()),
            groups: vec![ai],
            rules,
        },
        output_json: false,
        skip_unsupported: false,
    }
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current() -> Arc<Settings> {
        GLOBAL
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Parse settings content, trying YAML first and TOML second.
    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        let settings = match serde_yaml::from_str::<Settings>(content) {
            Ok(settings) => {
                debug!("Settings parsed as YAML");
                settings
            }
            Err(yaml_err) => match toml::from_str::<Settings>(content) {
                Ok(settings) => {
                    debug!("Settings parsed as TOML");
                    settings
                }
                Err(toml_err) => {
                    return Err(SettingsError::Format {
                        yaml: yaml_err.to_string(),
                        toml: toml_err.to_string(),
                    })
                }
            },
        };
        settings.validated()
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_content(&content)
    }

    fn validated(mut self) -> Result<Self, SettingsError> {
        if self.listen_address.trim().is_empty() {
            self.listen_address = Settings::default().listen_address;
        }
        if self.max_concur_threads == 0 {
            self.max_concur_threads = 1;
        }
        self.default_target = self.default_target.trim().to_lowercase();
        self.default_target
            .parse::<SubconverterTarget>()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        Ok(self)
    }
}

// Global settings instance
static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    *GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(settings);
}

/// Update settings directly from file path with proper locking
pub fn update_settings_from_file(path: impl AsRef<Path>) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path.as_ref())?;
    info!("Loaded settings from {}", path.as_ref().display());
    replace_global(settings);
    Ok(())
}

/// Replace the global settings with parsed `content`. On error the current
/// settings are kept.
pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    replace_global(Settings::load_from_content(content)?);
    Ok(())
}
