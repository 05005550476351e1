use crate::error::FetchError;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Source of raw documents for the site adapters.
///
/// HTML comes back as text; adapters parse it with `scraper::Html` inside
/// synchronous code so no parsed tree lives across an `.await`.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let body = self.fetch_html(url).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Json {
            url: url.to_string(),
            source,
        })
    }
}

/// One GET per call, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let http = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(http)?
            .error_for_status()
            .map_err(http)?;

        let bytes = resp.bytes().await.map_err(http)?;
        debug!(url, bytes = bytes.len(), "fetched");

        String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::Decode {
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned bodies by URL; unknown URLs fail like a 404 would.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
    }

    impl StaticFetcher {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait::async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Decode {
                url: url.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn fetch_json_parses_body() {
        let fetcher = StaticFetcher::default().with("https://feed.test/a", r#"{"ok": true}"#);
        let value = fetcher.fetch_json("https://feed.test/a").await.unwrap();
        assert_eq!(value["ok"], serde_json::Value::Bool(true));
    }

    #[tokio::test]
    async fn fetch_json_reports_invalid_body() {
        let fetcher = StaticFetcher::default().with("https://feed.test/a", "<html>");
        let err = fetcher.fetch_json("https://feed.test/a").await.unwrap_err();
        assert!(matches!(err, FetchError::Json { .. }));
    }
}
