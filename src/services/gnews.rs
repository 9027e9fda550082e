use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{NewsArticle, NewsFallback, NewsLookup};

const SEARCH_PATH: &str = "/api/v4/search";
const NEWS_LANGUAGE: &str = "id";
const MAX_RESULTS: usize = 3;
const SHORT_QUERY_CHARS: usize = 5;
const SHORT_QUERY_PREFIX: &str = "berita terbaru";
const UNKNOWN_SOURCE: &str = "Tidak diketahui";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    fn validate(self) -> Option<NewsArticle> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let url = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
        let source_name = self
            .source
            .and_then(|s| s.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Some(NewsArticle {
            title,
            source_name,
            url,
        })
    }
}

enum SearchOutcome {
    Articles(Vec<NewsArticle>),
    Rejected(StatusCode),
}

/// Client for the GNews search API.
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("kabar-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look up recent articles for `query`. Never fails: every problem is
    /// reported as a `NewsLookup::Unavailable`.
    pub async fn lookup(&self, query: &str) -> NewsLookup {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("GNews API key is not configured, skipping news lookup");
            return NewsLookup::Unavailable(NewsFallback::MissingApiKey);
        };

        let query = expand_query(query);

        match self.search(&query, api_key).await {
            Ok(SearchOutcome::Articles(articles)) if articles.is_empty() => {
                tracing::debug!("No news found for query");
                NewsLookup::Unavailable(NewsFallback::NoResults)
            }
            Ok(SearchOutcome::Articles(articles)) => {
                tracing::debug!("Fetched {} news articles", articles.len());
                NewsLookup::Found(articles)
            }
            Ok(SearchOutcome::Rejected(status)) => {
                tracing::error!("GNews request failed: HTTP {}", status);
                NewsLookup::Unavailable(NewsFallback::RequestFailed)
            }
            Err(e) => {
                // the request URL carries the API key
                tracing::error!("Error fetching news: {}", e.without_url());
                NewsLookup::Unavailable(NewsFallback::FetchError)
            }
        }
    }

    async fn search(
        &self,
        query: &str,
        api_key: &str,
    ) -> std::result::Result<SearchOutcome, reqwest::Error> {
        let max = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&[
                ("q", query),
                ("lang", NEWS_LANGUAGE),
                ("max", max.as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(SearchOutcome::Rejected(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        let articles = body
            .articles
            .into_iter()
            .filter_map(RawArticle::validate)
            .take(MAX_RESULTS)
            .collect();

        Ok(SearchOutcome::Articles(articles))
    }
}

/// Terse prompts search poorly, so they get a generic prefix.
fn expand_query(query: &str) -> String {
    if query.chars().count() < SHORT_QUERY_CHARS {
        format!("{} {}", SHORT_QUERY_PREFIX, query)
    } else {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard, key: Option<&str>) -> NewsClient {
        NewsClient::new(&server.url(), key.map(String::from), Duration::from_secs(5)).unwrap()
    }

    fn query_matcher(q: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), q.into()),
            Matcher::UrlEncoded("lang".into(), "id".into()),
            Matcher::UrlEncoded("max".into(), "3".into()),
            Matcher::UrlEncoded("apikey".into(), "news-key".into()),
        ])
    }

    #[test]
    fn short_queries_are_expanded() {
        assert_eq!(expand_query("hi"), "berita terbaru hi");
        assert_eq!(expand_query("bola"), "berita terbaru bola");
        assert_eq!(expand_query("dunia"), "dunia");
        // counted in characters, not bytes
        assert_eq!(expand_query("éééé"), "berita terbaru éééé");
    }

    #[tokio::test]
    async fn missing_key_returns_fallback_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let lookup = client(&server, None).lookup("berita ekonomi").await;

        assert_eq!(lookup, NewsLookup::Unavailable(NewsFallback::MissingApiKey));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn returns_validated_articles_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(query_matcher("berita terbaru bola"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"totalArticles":4,"articles":[
                    {"title":"Satu","url":"https://a.id/1","source":{"name":"Kompas"}},
                    {"title":"","url":"https://a.id/skip"},
                    {"title":"Dua","url":"https://a.id/2"},
                    {"title":"Tiga","url":"https://a.id/3","source":{"name":"Tempo"}},
                    {"title":"Empat","url":"https://a.id/4","source":{"name":"Detik"}}
                ]}"#,
            )
            .create_async()
            .await;

        let lookup = client(&server, Some("news-key")).lookup("bola").await;

        mock.assert_async().await;
        let articles = lookup.articles();
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].source_name, "Kompas");
        assert_eq!(articles[1].title, "Dua");
        assert_eq!(articles[1].source_name, UNKNOWN_SOURCE);
        assert_eq!(articles[2].url, "https://a.id/3");
    }

    #[tokio::test]
    async fn empty_result_is_no_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"totalArticles":0,"articles":[]}"#)
            .create_async()
            .await;

        let lookup = client(&server, Some("news-key")).lookup("berita politik").await;
        assert_eq!(lookup, NewsLookup::Unavailable(NewsFallback::NoResults));
    }

    #[tokio::test]
    async fn error_status_is_request_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"errors":["forbidden"]}"#)
            .create_async()
            .await;

        let lookup = client(&server, Some("news-key")).lookup("berita politik").await;
        assert_eq!(lookup, NewsLookup::Unavailable(NewsFallback::RequestFailed));
    }

    #[tokio::test]
    async fn malformed_body_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let lookup = client(&server, Some("news-key")).lookup("berita politik").await;
        assert_eq!(lookup, NewsLookup::Unavailable(NewsFallback::FetchError));
    }
}
