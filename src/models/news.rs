use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source_name: String,
    pub url: String,
}

impl NewsArticle {
    /// Markdown link line shown under an answer, numbered from 1.
    pub fn citation(&self, number: usize) -> String {
        format!("{}. [{}]({})", number, self.title, self.url)
    }
}

/// Why a lookup produced no articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsFallback {
    MissingApiKey,
    RequestFailed,
    NoResults,
    FetchError,
}

impl NewsFallback {
    pub fn message(&self) -> &'static str {
        match self {
            NewsFallback::MissingApiKey => "API key GNews belum dikonfigurasi.",
            NewsFallback::RequestFailed => "Gagal mengambil berita.",
            NewsFallback::NoResults => "Tidak ada berita terkait.",
            NewsFallback::FetchError => "Terjadi kesalahan saat mengambil berita.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsLookup {
    /// Never empty.
    Found(Vec<NewsArticle>),
    Unavailable(NewsFallback),
}

impl NewsLookup {
    pub fn articles(&self) -> &[NewsArticle] {
        match self {
            NewsLookup::Found(articles) => articles,
            NewsLookup::Unavailable(_) => &[],
        }
    }

    /// Text handed to the prompt composer: numbered excerpts, or the
    /// fallback message.
    pub fn context_text(&self) -> String {
        match self {
            NewsLookup::Found(articles) => articles
                .iter()
                .enumerate()
                .map(|(i, a)| format!("({}) {} - {}\n{}", i + 1, a.title, a.source_name, a.url))
                .collect::<Vec<_>>()
                .join("\n\n"),
            NewsLookup::Unavailable(fallback) => fallback.message().to_string(),
        }
    }
}
