//! NewsAPI.org gateway.
//!
//! One call against `/v2/everything` with the ticker as query, a from-date
//! window and publishedAt ordering — the feed's own most-recent-first order
//! is what the sentiment aggregator weights by.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use valuation_core::{NewsArticle, NewsGateway, NewsSort, ValuationError};

const BASE_URL: &str = "https://newsapi.org";

const PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    client: Client,
}

impl NewsApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, client }
    }
}

#[async_trait]
impl NewsGateway for NewsApiClient {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        language: &str,
        sort: NewsSort,
    ) -> Result<Vec<NewsArticle>, ValuationError> {
        let url = format!("{}/v2/everything", BASE_URL);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.to_string()),
                ("from", from.format("%Y-%m-%d").to_string()),
                ("language", language.to_string()),
                ("sortBy", sort.as_str().to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ValuationError::DataUnavailable(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))?;

        if body.status != "ok" {
            return Err(ValuationError::DataUnavailable(
                body.message
                    .unwrap_or_else(|| "news feed returned an error status".to_string()),
            ));
        }

        let articles: Vec<NewsArticle> = body
            .articles
            .into_iter()
            .map(ApiArticle::into_article)
            .collect();

        tracing::debug!(query, articles = articles.len(), "fetched news articles");
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: Option<ApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl ApiArticle {
    fn into_article(self) -> NewsArticle {
        NewsArticle {
            title: self.title.unwrap_or_default(),
            description: self.description,
            published_at: self.published_at.unwrap_or_else(Utc::now),
            url: self.url.unwrap_or_default(),
            source: self.source.and_then(|s| s.name),
        }
    }
}
