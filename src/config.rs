use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, Result};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GNEWS_API_KEY_ENV: &str = "GNEWS_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    pub gemini_api_key: Option<String>,
    pub gnews_api_key: Option<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_gnews_base_url")]
    pub gnews_base_url: String,

    /// Prompts containing any of these (case-insensitive) trigger a news lookup.
    #[serde(default = "default_news_keywords")]
    pub news_keywords: Vec<String>,

    #[serde(default = "default_news_timeout")]
    pub news_timeout_secs: u64,

    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gnews_base_url() -> String {
    "https://gnews.io".to_string()
}

fn default_news_keywords() -> Vec<String> {
    [
        "berita", "news", "headline", "politik", "politics", "ekonomi", "economy", "bola",
        "sports", "dunia", "world",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_news_timeout() -> u64 {
    30
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            gemini_api_key: None,
            gnews_api_key: None,
            default_model: default_model(),
            gemini_base_url: default_gemini_base_url(),
            gnews_base_url: default_gnews_base_url(),
            news_keywords: default_news_keywords(),
            news_timeout_secs: default_news_timeout(),
            generation_timeout_secs: default_generation_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Load the config from the default location, writing a fresh default
    /// file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kabar-chat")
            .join("config.toml")
    }

    /// Replace API keys with values from the environment. `lookup` is
    /// usually `|k| std::env::var(k).ok()`; blank values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(GEMINI_API_KEY_ENV) {
            self.gemini_api_key = Some(key);
        }
        if let Some(key) = non_blank(GNEWS_API_KEY_ENV) {
            self.gnews_api_key = Some(key);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("gemini_base_url", &self.gemini_base_url),
            ("gnews_base_url", &self.gnews_base_url),
        ] {
            Url::parse(value).map_err(|e| anyhow::anyhow!("invalid {}: {}", name, e))?;
        }

        if self.default_model.trim().is_empty() {
            return Err(AppError::Config("default_model must not be empty".to_string()));
        }
        if self.news_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::Config(
                "news_keywords must contain at least one keyword".to_string(),
            ));
        }
        if self.news_timeout_secs == 0 || self.generation_timeout_secs == 0 {
            return Err(AppError::Config("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn gemini_configured(&self) -> bool {
        self.gemini_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn gnews_configured(&self) -> bool {
        self.gnews_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
