/// Hakone Digest
///
/// Polls the Bilibili video search API for a keyword, ranks this week's
/// uploads by play count and the all-time pool by a weighted popularity
/// score, and renders both lists as a markdown digest.

pub mod candidates;
pub mod collector;
pub mod config;
pub mod counts;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod search;
pub mod video;

// Re-export main types for easy access
pub use crate::candidates::{gather_click_candidates, CandidateParams};
pub use crate::collector::{collect_recent_by_play, fetch_snapshot, PaginationParams, TimeWindow};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::counts::{normalize_count, normalize_text};
pub use crate::error::FetchError;
pub use crate::pipeline::DigestPipeline;
pub use crate::report::{exclude_seen, DigestReport};
pub use crate::scoring::{rank_by_weighted_score, ScoreWeights};
pub use crate::search::{BilibiliSearchClient, ScriptedSearchApi, SearchApi, SearchOrder, SearchQuery};
pub use crate::video::{VideoCounts, VideoRecord};
