/// Video search API access
///
/// Collection passes talk to the search endpoint only through [`SearchApi`],
/// one page per call. The reqwest-backed implementation lives in [`client`];
/// envelope decoding is kept separate so it can be exercised without a network.

pub mod client;
pub mod envelope;
pub mod scripted;

pub use client::BilibiliSearchClient;
pub use envelope::decode_search_body;
pub use scripted::ScriptedSearchApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::FetchResult;

/// Result orderings accepted by the search endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    /// Newest first
    Pubdate,
    /// Most played
    Click,
    /// Most commented
    Scores,
    /// Most favorited
    Stow,
    /// Most danmaku
    Dm,
    /// Relevance
    Totalrank,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Pubdate => "pubdate",
            SearchOrder::Click => "click",
            SearchOrder::Scores => "scores",
            SearchOrder::Stow => "stow",
            SearchOrder::Dm => "dm",
            SearchOrder::Totalrank => "totalrank",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pubdate" => Ok(SearchOrder::Pubdate),
            "click" => Ok(SearchOrder::Click),
            "scores" => Ok(SearchOrder::Scores),
            "stow" => Ok(SearchOrder::Stow),
            "dm" | "damku" => Ok(SearchOrder::Dm),
            "totalrank" | "default" => Ok(SearchOrder::Totalrank),
            other => Err(anyhow::anyhow!("Unknown search order: {}", other)),
        }
    }
}

/// Parameters for one search page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub order: SearchOrder,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(keyword: &str, order: SearchOrder, page: u32, page_size: u32) -> Self {
        Self {
            keyword: keyword.to_string(),
            order,
            page,
            page_size,
        }
    }

    /// Query string pairs in the order the endpoint documents them
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search_type", "video".to_string()),
            ("keyword", self.keyword.clone()),
            ("order", self.order.as_str().to_string()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }
}

/// One page of raw search result items
pub type SearchPage = Vec<Value>;

/// Trait for search backends
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch a single page; an empty page means there is no more data
    async fn search_page(&self, query: &SearchQuery) -> FetchResult<SearchPage>;
}
