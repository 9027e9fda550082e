use serde::{Deserialize, Serialize};

use super::NewsArticle;
use crate::error::GenerateError;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
pub const DEFAULT_TOP_P: f32 = 0.8;
pub const DEFAULT_TOP_K: u32 = 40;

pub const NO_SOURCES: &str = "Tidak ada sumber tambahan.";
pub const PROMPT_REQUIRED: &str = "Prompt wajib diisi.";

/// JSON body of `POST /api/generate`, exactly as the browser sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub prompt: Option<String>,
    pub image: Option<String>,
    pub mime_type: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Base64 image attached to a prompt. `data` may still carry a data-URI prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: Option<String>,
}

/// A validated request: the prompt is guaranteed non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub model: Option<String>,
    pub sampling: SamplingParams,
}

impl TryFrom<GenerateBody> for GenerationRequest {
    type Error = GenerateError;

    fn try_from(body: GenerateBody) -> Result<Self, Self::Error> {
        let prompt = body
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| GenerateError::InvalidRequest(PROMPT_REQUIRED.to_string()))?;

        let image = body
            .image
            .filter(|data| !data.is_empty())
            .map(|data| InlineImage {
                data,
                mime_type: body.mime_type.filter(|m| !m.is_empty()),
            });

        let defaults = SamplingParams::default();
        let sampling = SamplingParams {
            temperature: body.temperature.unwrap_or(defaults.temperature),
            max_output_tokens: body.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            top_p: body.top_p.unwrap_or(defaults.top_p),
            top_k: body.top_k.unwrap_or(defaults.top_k),
        };

        Ok(Self {
            prompt,
            image,
            model: body.model.filter(|m| !m.trim().is_empty()),
            sampling,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub output: String,
    pub sources: Vec<String>,
}

impl GenerationResult {
    pub fn new(output: String, articles: &[NewsArticle]) -> Self {
        let sources = if articles.is_empty() {
            vec![NO_SOURCES.to_string()]
        } else {
            articles
                .iter()
                .enumerate()
                .map(|(i, article)| article.citation(i + 1))
                .collect()
        };
        Self { output, sources }
    }
}
