/// Click-ordered candidate pool for weighted scoring
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::search::{SearchApi, SearchOrder, SearchQuery};
use crate::video::{is_video, item_bvid, VideoRecord};

/// Size and paging limits for the candidate pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CandidateParams {
    /// Number of candidates to gather
    pub candidate_count: usize,
    pub max_pages: u32,
    pub page_size: u32,
}

impl Default for CandidateParams {
    fn default() -> Self {
        Self {
            candidate_count: 20,
            max_pages: 5,
            page_size: 50,
        }
    }
}

/// Gather up to `candidate_count` distinct videos from the click-sorted
/// search order, re-sorted by normalized click count descending
pub async fn gather_click_candidates(
    api: &dyn SearchApi,
    keyword: &str,
    params: &CandidateParams,
) -> Vec<VideoRecord> {
    let mut collected: Vec<VideoRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1;

    while collected.len() < params.candidate_count && page <= params.max_pages {
        let query = SearchQuery::new(keyword, SearchOrder::Click, page, params.page_size);

        let items = match api.search_page(&query).await {
            Ok(items) => items,
            Err(e) => {
                warn!("⚠️ Stopping candidate pagination at page {}: {}", page, e);
                break;
            }
        };

        if items.is_empty() {
            debug!("Candidate page {} is empty, no more data", page);
            break;
        }

        for item in items.iter().filter(|item| is_video(item)) {
            let Some(bvid) = item_bvid(item) else {
                continue;
            };
            if !seen.insert(bvid.to_string()) {
                continue;
            }

            collected.push(VideoRecord::from_search_item(item, bvid));
            if collected.len() >= params.candidate_count {
                break;
            }
        }

        page += 1;
    }

    // The endpoint's own click ordering is not guaranteed to match normalized counts
    collected.sort_by(|a, b| b.counts.click.cmp(&a.counts.click));
    collected.truncate(params.candidate_count);

    info!("🎯 Gathered {} click-ranked candidates", collected.len());
    collected
}
