/// Bilibili search endpoint client
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{decode_search_body, SearchApi, SearchPage, SearchQuery};
use crate::config::{CredentialsConfig, SearchConfig};
use crate::error::{FetchError, FetchResult};

/// Search client carrying browser-like headers and the session cookie
#[derive(Clone)]
pub struct BilibiliSearchClient {
    client: Client,
    api_url: String,
}

impl BilibiliSearchClient {
    /// Create a new client. Each request is bounded by the configured timeout.
    pub fn new(search: &SearchConfig, credentials: &CredentialsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&credentials.user_agent).context("Invalid User-Agent header")?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&credentials.referer).context("Invalid Referer header")?,
        );

        match credentials.cookie.as_deref() {
            Some(cookie) if !cookie.trim().is_empty() => {
                let mut value = HeaderValue::from_str(cookie.trim()).context("Invalid cookie value")?;
                value.set_sensitive(true);
                headers.insert(COOKIE, value);
            }
            _ => warn!("⚠️ Building search client without a cookie"),
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(search.request_timeout_seconds))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: search.api_url.clone(),
        })
    }
}

#[async_trait]
impl SearchApi for BilibiliSearchClient {
    async fn search_page(&self, query: &SearchQuery) -> FetchResult<SearchPage> {
        debug!(
            "📡 Requesting search page {} (order: {}, page_size: {})",
            query.page, query.order, query.page_size
        );

        let response = self
            .client
            .get(&self.api_url)
            .query(&query.to_params())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        let result = decode_search_body(status, &body);
        match &result {
            Ok(items) => debug!("✅ Page {} returned {} items", query.page, items.len()),
            Err(FetchError::InvalidJson { snippet }) => {
                error!("❌ Search response is not JSON, the request was probably blocked. Check whether the cookie has expired");
                error!("First 100 chars of body: {}", snippet);
            }
            Err(FetchError::Api { code, message }) => {
                error!("❌ Search API error {}: {}", code, message);
            }
            Err(_) => {}
        }
        result
    }
}
