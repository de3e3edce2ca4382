//! # News
//!
//! Collects recent news articles matching a set of keywords from a list of source pages.

use crate::error::NewsError;
use crate::extract::{excerpt, extract_links, matches_keywords, parse_article, LinkRule};
use async_trait::async_trait;
use configuration::NewsConfig;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub mod extract;

/// Article pages downloaded at the same time for one source.
const CONCURRENT_DOWNLOADS: usize = 8;

/// A news article that matched the requested keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// The beginning of the article text.
    pub summary: String,
}

/// The abstract interface for a news provider.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_articles(&self, keywords: &[String]) -> Result<Vec<Article>, NewsError>;
}

/// Scrapes configured web pages for article links and downloads each article.
#[derive(Clone)]
pub struct WebNewsSource {
    client: Client,
    sources: Vec<Url>,
    excerpt_chars: usize,
}

impl WebNewsSource {
    pub fn new(config: &NewsConfig) -> Result<Self, NewsError> {
        let sources = config
            .sources
            .iter()
            .map(|s| Url::parse(s).map_err(|_| NewsError::InvalidUrl(s.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| NewsError::InvalidUserAgent(config.user_agent.clone()))?,
        );

        Ok(Self {
            client: Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?,
            sources,
            excerpt_chars: config.excerpt_chars,
        })
    }

    async fn download(&self, url: &Url) -> Result<String, NewsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Downloads one article and keeps it when it has text and mentions a keyword.
    async fn fetch_article(&self, url: Url, keywords: &[String]) -> Result<Option<Article>, NewsError> {
        let html = self.download(&url).await?;
        let parsed = parse_article(&html)?;

        if parsed.text.is_empty() || !matches_keywords(&parsed, keywords) {
            return Ok(None);
        }
        Ok(Some(Article {
            title: parsed.title,
            url: url.to_string(),
            summary: excerpt(&parsed.text, self.excerpt_chars),
        }))
    }

    async fn scan_source(&self, source: &Url, keywords: &[String]) -> Result<Vec<Article>, NewsError> {
        let page = self.download(source).await?;
        let links = extract_links(&page, source, LinkRule::for_source(source))?;
        tracing::debug!(%source, links = links.len(), "Found article links.");

        let results: Vec<_> = stream::iter(links)
            .map(|url| async move {
                let shown = url.to_string();
                (shown, self.fetch_article(url, keywords).await)
            })
            .buffered(CONCURRENT_DOWNLOADS)
            .collect()
            .await;

        let mut articles = Vec::new();
        for (url, result) in results {
            match result {
                Ok(Some(article)) => articles.push(article),
                Ok(None) => {}
                Err(e) => tracing::warn!(%url, error = %e, "Failed to process article, skipping."),
            }
        }
        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for WebNewsSource {
    async fn fetch_articles(&self, keywords: &[String]) -> Result<Vec<Article>, NewsError> {
        let mut articles = Vec::new();
        for source in &self.sources {
            match self.scan_source(source, keywords).await {
                Ok(found) => articles.extend(found),
                Err(e) => tracing::warn!(%source, error = %e, "Failed to fetch news source, skipping."),
            }
        }
        tracing::info!(articles = articles.len(), ?keywords, "Collected news articles.");
        Ok(articles)
    }
}
