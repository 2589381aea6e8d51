use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::counts::{first_truthy, normalize_count};

/// Keyword highlight markup the search API wraps around matched terms
const HIGHLIGHT_OPEN: &str = r#"<em class="keyword">"#;
const HIGHLIGHT_CLOSE: &str = "</em>";

const VIDEO_URL_PREFIX: &str = "https://www.bilibili.com/video/";

/// Count fields exactly as the search API returned them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCounts {
    pub play: Option<Value>,
    pub click: Option<Value>,
    pub reviews: Option<Value>,
    pub favorites: Option<Value>,
}

/// Integer counts derived from [`RawCounts`] when the record is created
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoCounts {
    /// Play count, falling back to click count
    pub play: u64,
    /// Click count, falling back to play count
    pub click: u64,
    /// Review (comment) count
    pub scores: u64,
    /// Favorite count
    pub stow: u64,
}

/// A single video from a search result page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    /// External unique id (bvid)
    pub bvid: String,
    /// Title with keyword highlight markup removed
    pub title: String,
    pub author: String,
    /// Publish time, epoch seconds
    pub pubdate: i64,
    /// Publish date in local time, `YYYY-MM-DD`
    pub date: String,
    pub url: String,
    pub raw: RawCounts,
    pub counts: VideoCounts,
    /// Set once by the weighted scorer
    pub weighted_score: Option<f64>,
}

impl VideoRecord {
    /// Build a record from a raw search item whose bvid has already been validated
    pub fn from_search_item(item: &Value, bvid: &str) -> Self {
        let raw = RawCounts {
            play: item.get("play").cloned(),
            click: item.get("click").cloned(),
            reviews: first_truthy(&[item.get("reviews"), item.get("review"), item.get("scores")]).cloned(),
            favorites: first_truthy(&[item.get("favorites"), item.get("stow")]).cloned(),
        };
        let counts = VideoCounts::from_raw(&raw);
        let pubdate = item_pubdate(item);

        Self {
            bvid: bvid.to_string(),
            title: strip_highlight(item.get("title").and_then(Value::as_str).unwrap_or("")),
            author: item.get("author").and_then(Value::as_str).unwrap_or("").to_string(),
            pubdate,
            date: format_pubdate(pubdate),
            url: format!("{}{}", VIDEO_URL_PREFIX, bvid),
            raw,
            counts,
            weighted_score: None,
        }
    }
}

impl VideoCounts {
    pub fn from_raw(raw: &RawCounts) -> Self {
        Self {
            play: normalize_count(first_truthy(&[raw.play.as_ref(), raw.click.as_ref()])),
            click: normalize_count(first_truthy(&[raw.click.as_ref(), raw.play.as_ref()])),
            scores: normalize_count(raw.reviews.as_ref()),
            stow: normalize_count(raw.favorites.as_ref()),
        }
    }
}

/// True when the item's kind discriminator marks it as a video
pub fn is_video(item: &Value) -> bool {
    item.get("type").and_then(Value::as_str) == Some("video")
}

/// The item's bvid, if present and non-empty
pub fn item_bvid(item: &Value) -> Option<&str> {
    item.get("bvid")
        .and_then(Value::as_str)
        .filter(|bvid| !bvid.is_empty())
}

/// Publish time in epoch seconds; missing or malformed values read as 0
pub fn item_pubdate(item: &Value) -> i64 {
    match item.get("pubdate") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Remove keyword highlight markup from a title
pub fn strip_highlight(title: &str) -> String {
    title.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "")
}

/// Format an epoch timestamp as a local `YYYY-MM-DD` date
pub fn format_pubdate(pubdate: i64) -> String {
    DateTime::from_timestamp(pubdate, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
