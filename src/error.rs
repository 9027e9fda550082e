use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Gemini API error: {0}")]
    GeminiApi(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Outcome of a failed `/api/generate` request.
///
/// News failures never show up here; they are absorbed by the lookup.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The caller sent something unusable (missing prompt, broken JSON).
    #[error("{0}")]
    InvalidRequest(String),

    /// A required secret is missing on the server side.
    #[error("{0}")]
    Configuration(String),

    /// The generation endpoint failed.
    #[error("{0}")]
    Upstream(String),
}

impl GenerateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerateError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GenerateError::Configuration(_) | GenerateError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
