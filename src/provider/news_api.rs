use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app::{FeedError, Result};
use crate::config::ProviderConfig;
use crate::domain::RawArticle;
use crate::provider::ArticleProvider;

/// Body of a `top-headlines` response.
#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    message: Option<String>,
}

/// Fetches top headlines from a NewsAPI-compatible endpoint.
pub struct NewsApiProvider {
    client: Client,
    config: ProviderConfig,
}

impl NewsApiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent("headline-sync/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    fn headlines_url(&self, page_size: usize) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/top-headlines", base))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("country", &self.config.country);
            query.append_pair("pageSize", &page_size.to_string());
            if let Some(ref key) = self.config.api_key {
                query.append_pair("apiKey", key);
            }
        }

        Ok(url)
    }

    fn parse_body(body: &[u8]) -> Result<Vec<RawArticle>> {
        let response: HeadlinesResponse = serde_json::from_slice(body)
            .map_err(|e| FeedError::Provider(format!("malformed response: {}", e)))?;

        if response.status != "ok" {
            return Err(FeedError::Provider(
                response
                    .message
                    .unwrap_or_else(|| format!("provider returned status {}", response.status)),
            ));
        }

        Ok(response.articles)
    }
}

#[async_trait]
impl ArticleProvider for NewsApiProvider {
    async fn fetch(&self, page_size: usize) -> Result<Vec<RawArticle>> {
        let url = self.headlines_url(page_size)?;
        tracing::debug!("Fetching {} headlines from {}", page_size, url.path());

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        let mut articles = Self::parse_body(&body)?;
        articles.truncate(page_size);

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> NewsApiProvider {
        NewsApiProvider::new(ProviderConfig {
            base_url: "https://news.example.com/v2/".into(),
            country: "gb".into(),
            api_key: api_key.map(String::from),
            timeout_secs: 5,
        })
    }

    #[test]
    fn test_headlines_url_includes_query() {
        let url = provider(Some("secret")).headlines_url(100).unwrap();
        assert_eq!(url.path(), "/v2/top-headlines");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("country".into(), "gb".into())));
        assert!(pairs.contains(&("pageSize".into(), "100".into())));
        assert!(pairs.contains(&("apiKey".into(), "secret".into())));
    }

    #[test]
    fn test_headlines_url_without_key() {
        let url = provider(None).headlines_url(20).unwrap();
        assert!(url.query_pairs().all(|(k, _)| k != "apiKey"));
    }

    #[test]
    fn test_parse_body_keeps_provider_order() {
        let body = br#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "A"}, "title": "newest", "url": "https://a", "publishedAt": "2024-03-02T00:00:00Z"},
                {"source": {"id": "b", "name": "B"}, "title": "older", "url": "https://b", "publishedAt": "2024-03-01T00:00:00Z"}
            ]
        }"#;
        let articles = NewsApiProvider::parse_body(body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "newest");
        assert_eq!(articles[1].source.id.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_body_tolerates_null_fields() {
        let body = br#"{
            "status": "ok",
            "articles": [
                {"source": {"id": null, "name": "A"}, "title": "complete", "url": "https://a", "publishedAt": "2024-03-02T00:00:00Z"},
                {"source": null, "author": null, "title": null, "url": "https://b", "publishedAt": null, "content": null}
            ]
        }"#;
        let articles = NewsApiProvider::parse_body(body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "complete");
        assert!(articles[1].title.is_empty());
        assert!(articles[1].published_at.is_empty());
        assert_eq!(articles[1].url, "https://b");
    }

    #[test]
    fn test_parse_body_error_status() {
        let body = br#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;
        let err = NewsApiProvider::parse_body(body).unwrap_err();
        assert!(err.is_provider_failure());
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[test]
    fn test_parse_body_missing_articles_is_empty() {
        let articles = NewsApiProvider::parse_body(br#"{"status": "ok"}"#).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_parse_body_malformed() {
        let err = NewsApiProvider::parse_body(b"<html>").unwrap_err();
        assert!(err.is_provider_failure());
    }
}
