use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{InlineImage, SamplingParams};

const DEFAULT_IMAGE_MIME: &str = "image/png";
const DATA_URI_PREFIX: &str = r"^data:image/\w+;base64,";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a SamplingParams,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    data_uri: Regex,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            data_uri: Regex::new(DATA_URI_PREFIX)?,
        })
    }

    /// Send `prompt` (and an optional image) to `model` and return the
    /// generated text. When the response holds no text, its raw JSON is
    /// returned instead.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
        sampling: &SamplingParams,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: self.parts(prompt, image),
            }],
            generation_config: sampling,
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(model)
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(AppError::GeminiApi(format!("[{}] {}", status, message)));
        }

        let raw: serde_json::Value = response.json().await?;
        match extract_text(&raw) {
            Some(text) => Ok(text),
            None => {
                tracing::warn!("Gemini response had no text, returning raw response");
                Ok(serde_json::to_string(&raw)?)
            }
        }
    }

    fn parts<'a>(&self, prompt: &'a str, image: Option<&'a InlineImage>) -> Vec<Part<'a>> {
        let mut parts = vec![Part::Text(prompt)];

        if let Some(image) = image {
            let data = match self.data_uri.find(&image.data) {
                Some(prefix) => &image.data[prefix.end()..],
                None => image.data.as_str(),
            };
            parts.push(Part::InlineData(InlineData {
                mime_type: image.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME),
                data,
            }));
        }

        parts
    }
}

fn extract_text(raw: &serde_json::Value) -> Option<String> {
    let response = GenerateContentResponse::deserialize(raw).ok()?;
    let texts: Vec<String> = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}
