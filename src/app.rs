use std::time::Duration;

use chrono::Local;

use crate::ai::{compose_prompt, GeminiClient};
use crate::config::Config;
use crate::error::{GenerateError, Result};
use crate::models::{GenerateBody, GenerationRequest, GenerationResult, NewsLookup};
use crate::services::{NewsClient, NewsTrigger};

const MISSING_GEMINI_KEY: &str = "GEMINI_API_KEY belum dikonfigurasi di server.";
const GENERIC_SERVER_ERROR: &str = "Terjadi kesalahan pada server.";

/// Answers chat prompts, pulling in news context when the prompt looks
/// like it is about current events.
pub struct ChatService {
    news: NewsClient,
    gemini: Option<GeminiClient>,
    trigger: NewsTrigger,
    default_model: String,
}

impl ChatService {
    pub fn new(config: &Config) -> Result<Self> {
        let news = NewsClient::new(
            &config.gnews_base_url,
            config.gnews_api_key.clone(),
            Duration::from_secs(config.news_timeout_secs),
        )?;

        let gemini = match config.gemini_api_key.as_ref() {
            Some(key) if config.gemini_configured() => Some(GeminiClient::new(
                &config.gemini_base_url,
                key.clone(),
                Duration::from_secs(config.generation_timeout_secs),
            )?),
            _ => None,
        };

        Ok(Self {
            news,
            gemini,
            trigger: NewsTrigger::new(&config.news_keywords)?,
            default_model: config.default_model.clone(),
        })
    }

    pub fn gemini_configured(&self) -> bool {
        self.gemini.is_some()
    }

    pub fn news_configured(&self) -> bool {
        self.news.is_configured()
    }

    pub async fn handle(
        &self,
        body: GenerateBody,
    ) -> std::result::Result<GenerationResult, GenerateError> {
        let request = GenerationRequest::try_from(body)?;

        let gemini = self
            .gemini
            .as_ref()
            .ok_or_else(|| GenerateError::Configuration(MISSING_GEMINI_KEY.to_string()))?;

        let lookup = if self.trigger.matches(&request.prompt) {
            tracing::info!("Prompt matches news keywords, looking up news");
            Some(self.news.lookup(&request.prompt).await)
        } else {
            None
        };
        tracing::debug!(prompt = %request.prompt, news = lookup.is_some(), "Handling prompt");

        let news_text = lookup
            .as_ref()
            .map(NewsLookup::context_text)
            .unwrap_or_default();
        let composite = compose_prompt(&request.prompt, &news_text, Local::now().date_naive());

        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let output = gemini
            .generate(model, &composite, request.image.as_ref(), &request.sampling)
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                let message = e.to_string();
                if message.trim().is_empty() {
                    GenerateError::Upstream(GENERIC_SERVER_ERROR.to_string())
                } else {
                    GenerateError::Upstream(message)
                }
            })?;

        let articles = lookup.as_ref().map(NewsLookup::articles).unwrap_or_default();
        Ok(GenerationResult::new(output, articles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_SOURCES;
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::json;

    const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
    const NEWS_PATH: &str = "/api/v4/search";

    fn config(server: &ServerGuard, gemini_key: Option<&str>) -> Config {
        Config {
            gemini_api_key: gemini_key.map(String::from),
            gnews_api_key: Some("news-key".to_string()),
            gemini_base_url: server.url(),
            gnews_base_url: server.url(),
            news_timeout_secs: 5,
            generation_timeout_secs: 5,
            ..Config::default()
        }
    }

    fn prompt(text: &str) -> GenerateBody {
        GenerateBody {
            prompt: Some(text.to_string()),
            ..Default::default()
        }
    }

    async fn gemini_ok(server: &mut ServerGuard, text: &str) -> Mock {
        server
            .mock("POST", GEMINI_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn news_prompt_gets_numbered_citations() {
        let mut server = mockito::Server::new_async().await;
        let news = server
            .mock("GET", NEWS_PATH)
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                "apa berita ekonomi hari ini".into(),
            ))
            .with_status(200)
            .with_body(
                json!({"articles": [
                    {"title": "title1", "url": "https://n.id/1", "source": {"name": "Kompas"}},
                    {"title": "title2", "url": "https://n.id/2", "source": {"name": "Tempo"}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let gemini = server
            .mock("POST", GEMINI_PATH)
            .match_body(Matcher::Regex(r"\(1\) title1 - Kompas".to_string()))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Ekonomi tumbuh [1]."}]}}]}"#)
            .create_async()
            .await;

        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();
        let result = service.handle(prompt("apa berita ekonomi hari ini")).await.unwrap();

        news.assert_async().await;
        gemini.assert_async().await;
        assert_eq!(result.output, "Ekonomi tumbuh [1].");
        assert_eq!(
            result.sources,
            vec![
                "1. [title1](https://n.id/1)".to_string(),
                "2. [title2](https://n.id/2)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn unrelated_prompt_skips_news() {
        let mut server = mockito::Server::new_async().await;
        let news = server
            .mock("GET", NEWS_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let gemini = gemini_ok(&mut server, "Halo!").await;

        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();
        let result = service.handle(prompt("hi")).await.unwrap();

        news.assert_async().await;
        gemini.assert_async().await;
        assert_eq!(result.output, "Halo!");
        assert_eq!(result.sources, vec![NO_SOURCES.to_string()]);
    }

    #[tokio::test]
    async fn failed_news_lookup_degrades_to_fallback_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", NEWS_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let gemini = server
            .mock("POST", GEMINI_PATH)
            .match_body(Matcher::Regex("Gagal mengambil berita.".to_string()))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Maaf, saya tidak tahu."}]}}]}"#)
            .create_async()
            .await;

        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();
        let result = service.handle(prompt("berita politik terkini")).await.unwrap();

        gemini.assert_async().await;
        assert_eq!(result.sources, vec![NO_SOURCES.to_string()]);
    }

    #[tokio::test]
    async fn missing_prompt_is_invalid_request() {
        let server = mockito::Server::new_async().await;
        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();

        let err = service.handle(GenerateBody::default()).await.unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRequest(ref m) if m.contains("Prompt")));
    }

    #[tokio::test]
    async fn missing_gemini_key_never_calls_upstream() {
        let mut server = mockito::Server::new_async().await;
        let gemini = server
            .mock("POST", GEMINI_PATH)
            .expect(0)
            .create_async()
            .await;
        let news = server
            .mock("GET", NEWS_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let service = ChatService::new(&config(&server, None)).unwrap();
        assert!(!service.gemini_configured());

        let err = service.handle(prompt("berita dunia")).await.unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)));
        assert!(!err.to_string().contains("gem-key"));

        gemini.assert_async().await;
        news.assert_async().await;
    }

    #[tokio::test]
    async fn gemini_failure_is_upstream_error_with_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GEMINI_PATH)
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();
        let err = service.handle(prompt("hi")).await.unwrap_err();

        match err {
            GenerateError::Upstream(msg) => assert!(msg.contains("Quota exceeded")),
            other => panic!("expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn request_model_overrides_default() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-pro:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create_async()
            .await;

        let service = ChatService::new(&config(&server, Some("gem-key"))).unwrap();
        let body = GenerateBody {
            model: Some("gemini-1.5-pro".to_string()),
            ..prompt("halo")
        };
        let result = service.handle(body).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.output, "ok");
    }
}
