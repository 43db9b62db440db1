use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use rmscope_core::{Category, FetchConfig, ProfileConfig};
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, Result};

/// One page of records for a category. `start` is 1-based.
///
/// Implementations make a single attempt; retrying belongs to
/// [`FetchController`](crate::fetch::FetchController).
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, category: Category, start: usize, limit: usize) -> Result<Vec<Value>>;
}

/// JSON page source backed by the public profile API.
pub struct ResearchmapClient {
    client: reqwest::Client,
    base_url: String,
    permalink: String,
    lang: String,
}

impl ResearchmapClient {
    pub fn new(profile: &ProfileConfig, fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&fetch.user_agent)
            .gzip(true)
            .timeout(fetch.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: profile.api_base_url.trim_end_matches('/').to_string(),
            permalink: profile.permalink.clone(),
            lang: profile.lang.clone(),
        })
    }

    /// `{base}/{permalink}/{category}?format=json&lang=..&limit=..&start=..`
    pub fn page_url(&self, category: Category, start: usize, limit: usize) -> String {
        format!(
            "{}/{}/{}?format=json&lang={}&limit={}&start={}",
            self.base_url,
            urlencoding::encode(&self.permalink),
            urlencoding::encode(category.key()),
            urlencoding::encode(&self.lang),
            limit,
            start
        )
    }
}

/// The `items` array of a page body. A missing or non-array `items` is an empty page.
fn page_items(body: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let Value::Object(mut map) = value else {
        return Err(FetchError::Parse("expected a JSON object".to_string()));
    };
    match map.remove("items") {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl PageSource for ResearchmapClient {
    async fn fetch_page(&self, category: Category, start: usize, limit: usize) -> Result<Vec<Value>> {
        let url = self.page_url(category, start, limit);
        debug!(%url, "GET page");

        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(FetchError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = resp.text().await?;
        page_items(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(base_url: &str) -> ResearchmapClient {
        let profile = ProfileConfig {
            api_base_url: base_url.to_string(),
            ..ProfileConfig::default()
        };
        ResearchmapClient::new(&profile, &FetchConfig::default()).unwrap()
    }

    #[test]
    fn page_url_encodes_components() {
        let profile = ProfileConfig {
            permalink: "a b".to_string(),
            lang: "en".to_string(),
            api_base_url: "https://api.researchmap.jp/".to_string(),
            ..ProfileConfig::default()
        };
        let client = ResearchmapClient::new(&profile, &FetchConfig::default()).unwrap();
        assert_eq!(
            client.page_url(Category::BooksEtc, 201, 200),
            "https://api.researchmap.jp/a%20b/books_etc?format=json&lang=en&limit=200&start=201"
        );
    }

    #[test]
    fn page_items_tolerates_missing_items() {
        assert_eq!(page_items(r#"{"items": [1, 2]}"#).unwrap().len(), 2);
        assert!(page_items(r#"{"total_items": 0}"#).unwrap().is_empty());
        assert!(page_items(r#"{"items": null}"#).unwrap().is_empty());
        assert!(matches!(page_items("[1]"), Err(FetchError::Parse(_))));
        assert!(matches!(page_items("<html>"), Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn fetches_items_with_query_parameters() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tokuo/published_papers")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("lang".into(), "en".into()),
                Matcher::UrlEncoded("limit".into(), "200".into()),
                Matcher::UrlEncoded("start".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"paper_title": {"en": "A"}}, {"paper_title": {"en": "B"}}]}"#)
            .create_async()
            .await;

        let items = client(&server.url())
            .fetch_page(Category::PublishedPapers, 1, 200)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["paper_title"]["en"], "B");
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tokuo/awards")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let err = client(&server.url())
            .fetch_page(Category::Awards, 1, 200)
            .await
            .unwrap_err();
        match err {
            FetchError::RateLimited { retry_after } => assert_eq!(retry_after.as_deref(), Some("7")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tokuo/misc")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server.url())
            .fetch_page(Category::Misc, 1, 200)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(err.to_string(), "HTTP 503 Service Unavailable");
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tokuo/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server.url())
            .fetch_page(Category::Works, 1, 200)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn controller_pages_through_the_api() {
        use crate::fetch::FetchController;

        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/tokuo/presentations")
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"items": [{"presentation_title": {"en": "Talk A"}}, {"presentation_title": {"en": "Talk B"}}]}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/tokuo/presentations")
            .match_query(Matcher::UrlEncoded("start".into(), "3".into()))
            .with_status(200)
            .with_body(r#"{"items": [{"presentation_title": {"en": "Talk C"}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let fetch = FetchConfig {
            page_size: 2,
            ..FetchConfig::default()
        }
        .without_delays();
        let controller = FetchController::new(client(&server.url()), fetch);
        let records = controller.fetch_category(Category::Presentations).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["presentation_title"]["en"], "Talk C");
        first.assert_async().await;
        second.assert_async().await;
    }
}
