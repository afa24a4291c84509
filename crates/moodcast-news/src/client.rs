//! NewsAPI client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::NewsError;
use crate::types::{NewsCategory, NewsResponse, RawArticle};

pub const NEWSAPI_BASE: &str = "https://newsapi.org";
const PAGE_SIZE: u32 = 20;

/// Upstream article feed. Both calls return raw, unnormalized records.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Free-text search, newest first, English only.
    async fn search(&self, query: &str) -> Result<Vec<RawArticle>, NewsError>;

    async fn top_headlines(
        &self,
        country: &str,
        category: NewsCategory,
    ) -> Result<Vec<RawArticle>, NewsError>;
}

pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<RawArticle>, NewsError> {
        let url = format!("{}/v2/{}", self.base_url, endpoint);
        tracing::debug!("GET {} {:?}", url, params);

        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("pageSize", page_size.as_str()), ("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<RawArticle>, NewsError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("News API error: {} {}", status, body);
            return Err(NewsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: NewsResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Parse(e.to_string()))?;

        if payload.status != "ok" {
            return Err(NewsError::Provider {
                code: payload.code.unwrap_or_else(|| payload.status.clone()),
                message: payload.message.unwrap_or_default(),
            });
        }

        Ok(payload.articles)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self), level = "info")]
    async fn search(&self, query: &str) -> Result<Vec<RawArticle>, NewsError> {
        self.get(
            "everything",
            &[("q", query), ("language", "en"), ("sortBy", "publishedAt")],
        )
        .await
    }

    #[instrument(skip(self), level = "info")]
    async fn top_headlines(
        &self,
        country: &str,
        category: NewsCategory,
    ) -> Result<Vec<RawArticle>, NewsError> {
        self.get(
            "top-headlines",
            &[("country", country), ("category", category.as_str())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NewsApiClient {
        NewsApiClient::with_base_url("news_key", &server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn ok_body(titles: &[&str]) -> serde_json::Value {
        let articles: Vec<serde_json::Value> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                serde_json::json!({
                    "title": t,
                    "description": "desc",
                    "url": format!("https://n.example/{}", i),
                    "urlToImage": null,
                    "publishedAt": "2024-05-01T10:00:00Z",
                    "source": {"id": null, "name": "Wire"}
                })
            })
            .collect();
        serde_json::json!({"status": "ok", "totalResults": titles.len(), "articles": articles})
    }

    #[tokio::test]
    async fn test_search_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "warning OR danger"))
            .and(query_param("language", "en"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("pageSize", "20"))
            .and(query_param("apiKey", "news_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["A", "B"])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client(&server).search("warning OR danger").await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_top_headlines_sends_country_and_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "in"))
            .and(query_param("category", "sports"))
            .and(query_param("pageSize", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["Match"])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client(&server)
            .top_headlines("in", NewsCategory::Sports)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(426).set_body_string("upgrade required"))
            .mount(&server)
            .await;

        let err = client(&server).search("x").await.unwrap_err();
        assert!(matches!(err, NewsError::Status { status: 426, .. }));
    }

    #[tokio::test]
    async fn test_provider_error_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "code": "parameterInvalid",
                "message": "bad country"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .top_headlines("zz", NewsCategory::General)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NewsError::Provider { ref code, ref message }
                if code == "parameterInvalid" && message == "bad country"
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).search("x").await.unwrap_err();
        assert!(matches!(err, NewsError::Parse(_)));
    }
}
