/// Search response envelope decoding
use serde::Deserialize;
use serde_json::Value;

use super::SearchPage;
use crate::error::{FetchError, FetchResult};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    result: Value,
}

/// Decode an HTTP response into result items.
///
/// Non-200 status, non-JSON bodies and non-zero business codes are errors.
/// A successful envelope without an array under `data.result` yields an
/// empty page.
pub fn decode_search_body(status: u16, body: &str) -> FetchResult<SearchPage> {
    if status != 200 {
        return Err(FetchError::HttpStatus(status));
    }

    let envelope: SearchEnvelope =
        serde_json::from_str(body).map_err(|_| FetchError::invalid_json(body))?;

    match envelope.code {
        Some(0) => {}
        code => {
            return Err(FetchError::Api {
                code: code.unwrap_or(-1),
                message: envelope.message.unwrap_or_default(),
            })
        }
    }

    match envelope.data.map(|data| data.result) {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}
