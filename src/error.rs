/// Error types for search page requests.
///
/// Every variant aborts the current pagination pass; records gathered from
/// earlier pages are kept.

/// Result type for a single search page request
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP request failed with status {0}")]
    HttpStatus(u16),

    #[error("response body is not JSON (first 100 chars: {snippet})")]
    InvalidJson { snippet: String },

    #[error("search API returned code {code}: {message}")]
    Api { code: i64, message: String },
}

impl FetchError {
    /// Build an `InvalidJson` error carrying the first 100 characters of the body
    pub fn invalid_json(body: &str) -> Self {
        FetchError::InvalidJson {
            snippet: body.chars().take(100).collect(),
        }
    }
}
