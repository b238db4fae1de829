use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ─── Top-level config ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Provider credential for direct mode. Usually left unset in the file
    /// and supplied through the environment instead.
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            api_key: None,
            default_temperature: default_temperature(),
            backend: BackendConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

// ─── Backend strategy ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The companion REST API (generate/refine/score/convert endpoints).
    #[default]
    Proxy,
    /// An OpenAI-compatible provider called directly with built prompts.
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,

    /// Base URL of the email proxy API (proxy mode).
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Base URL of the OpenAI-compatible provider (direct mode).
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Fallback model for direct mode when none is selected yet.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            proxy_url: default_proxy_url(),
            provider_url: default_provider_url(),
            model: default_model(),
        }
    }
}

// ─── Notifier ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// "console" (styled terminal output) or "log" (tracing).
    #[serde(default = "default_notifier_backend")]
    pub backend: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: default_notifier_backend(),
        }
    }
}

fn default_temperature() -> f64 {
    0.7
}

fn default_proxy_url() -> String {
    "http://localhost:8000".into()
}

fn default_provider_url() -> String {
    "https://api.openai.com".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_notifier_backend() -> String {
    "console".into()
}

impl Config {
    /// Load `~/.mailforge/config.toml`, writing the default file on first run.
    pub fn load_or_init() -> Result<Self> {
        let user_dirs = UserDirs::new().context("could not determine home directory")?;
        let dir = user_dirs.home_dir().join(".mailforge");
        let path = dir.join("config.toml");

        if path.exists() {
            return Self::load_from(&path);
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
        let config = Self {
            config_path: path.clone(),
            ..Self::default()
        };
        let rendered = toml::to_string_pretty(&config).context("serializing default config")?;
        fs::write(&path, rendered)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        Ok(config)
    }

    /// Load a config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        let mut config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(ConfigError::Validation(format!(
                "default_temperature must be within [0, 1], got {}",
                self.default_temperature
            )));
        }
        let base_url = match self.backend.mode {
            BackendMode::Proxy => &self.backend.proxy_url,
            BackendMode::Direct => &self.backend.provider_url,
        };
        if base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend base URL must not be empty".into(),
            ));
        }
        Ok(())
    }
}
