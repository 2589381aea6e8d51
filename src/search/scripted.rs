/// Replays recorded search responses instead of calling the live endpoint
///
/// Responses are queued per [`SearchOrder`] and served in page order. Every
/// response goes through [`decode_search_body`], so a recorded block page or
/// API error behaves exactly like the real thing. Requests past the end of the
/// script get an empty result page.
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::{decode_search_body, SearchApi, SearchOrder, SearchPage, SearchQuery};
use crate::error::FetchResult;

#[derive(Debug, Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
pub struct ScriptedSearchApi {
    responses: HashMap<SearchOrder, Vec<ScriptedResponse>>,
    requests: Mutex<Vec<SearchQuery>>,
}

impl ScriptedSearchApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful page containing `items`
    pub fn with_items(self, order: SearchOrder, items: Vec<Value>) -> Self {
        let body = json!({ "code": 0, "message": "0", "data": { "result": items } }).to_string();
        self.with_response(order, 200, &body)
    }

    /// Queue a raw HTTP response
    pub fn with_response(mut self, order: SearchOrder, status: u16, body: &str) -> Self {
        self.responses.entry(order).or_default().push(ScriptedResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    /// Load a fixture file: a JSON object mapping order names to arrays of
    /// full response envelopes, one per page
    pub fn from_fixture_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let fixture: HashMap<String, Vec<Value>> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))?;

        let mut api = Self::new();
        for (order, pages) in fixture {
            let order: SearchOrder = order.parse()?;
            for page in pages {
                api = api.with_response(order, 200, &page.to_string());
            }
        }
        Ok(api)
    }

    /// Queries received so far, in order
    pub fn requests(&self) -> Vec<SearchQuery> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SearchApi for ScriptedSearchApi {
    async fn search_page(&self, query: &SearchQuery) -> FetchResult<SearchPage> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.clone());

        let response = (query.page as usize)
            .checked_sub(1)
            .and_then(|index| self.responses.get(&query.order)?.get(index));

        match response {
            Some(response) => decode_search_body(response.status, &response.body),
            None => Ok(Vec::new()),
        }
    }
}
