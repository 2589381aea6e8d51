/// Time-window collection: this week's videos ranked by play count
///
/// Pages are requested newest first. Pagination stops on the first failed
/// page (keeping what was already gathered), on an empty page, or as soon as
/// a page contains nothing newer than the window start.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::search::{SearchApi, SearchOrder, SearchQuery};
use crate::video::{is_video, item_bvid, item_pubdate, VideoRecord};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Page size used by the single-page snapshot fetch
pub const SNAPSHOT_PAGE_SIZE: u32 = 20;

/// Paging limits for the time-window collector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationParams {
    /// Maximum number of records returned
    pub limit: usize,
    pub max_pages: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: 10,
            max_pages: 10,
            page_size: 50,
        }
    }
}

/// Trailing time window, epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Window of `days` days ending at `now`
    pub fn trailing_days(now: i64, days: i64) -> Self {
        Self {
            start: now - days * SECONDS_PER_DAY,
            end: now,
        }
    }

    /// Only the lower bound is checked; videos stamped slightly in the future still count
    pub fn includes(&self, pubdate: i64) -> bool {
        pubdate >= self.start
    }
}

/// Collect videos published inside `window`, ranked by play count descending
pub async fn collect_recent_by_play(
    api: &dyn SearchApi,
    keyword: &str,
    window: TimeWindow,
    params: &PaginationParams,
) -> Vec<VideoRecord> {
    let mut collected = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for page in 1..=params.max_pages {
        let query = SearchQuery::new(keyword, SearchOrder::Pubdate, page, params.page_size);

        let items = match api.search_page(&query).await {
            Ok(items) => items,
            Err(e) => {
                warn!("⚠️ Stopping recent-video pagination at page {}: {}", page, e);
                break;
            }
        };

        if items.is_empty() {
            debug!("Page {} is empty, no more data", page);
            break;
        }

        let mut all_older = true;
        for item in items.iter().filter(|item| is_video(item)) {
            let in_window = window.includes(item_pubdate(item));
            if in_window {
                all_older = false;
            }

            let Some(bvid) = item_bvid(item) else {
                continue;
            };
            // Out-of-window videos are remembered too, so a later page can't resurface them
            if !seen.insert(bvid.to_string()) {
                continue;
            }
            if in_window {
                collected.push(VideoRecord::from_search_item(item, bvid));
            }
        }

        debug!("Page {}: {} videos in window so far", page, collected.len());

        if all_older {
            info!("🛑 Page {} is entirely older than the window, stopping early", page);
            break;
        }
    }

    collected.sort_by(|a, b| b.counts.play.cmp(&a.counts.play));
    collected.truncate(params.limit);

    info!("📊 Collected {} recent videos ranked by play count", collected.len());
    collected
}

/// Fetch the first page in the given order and keep up to `limit` videos.
///
/// No deduplication or window filtering; used for a quick look at what the
/// endpoint currently returns.
pub async fn fetch_snapshot(
    api: &dyn SearchApi,
    keyword: &str,
    order: SearchOrder,
    limit: usize,
) -> Vec<VideoRecord> {
    info!("📡 Requesting search snapshot (order: {})...", order);

    let query = SearchQuery::new(keyword, order, 1, SNAPSHOT_PAGE_SIZE);
    let items = match api.search_page(&query).await {
        Ok(items) => items,
        Err(e) => {
            warn!("⚠️ Snapshot request failed: {}", e);
            return Vec::new();
        }
    };

    let videos: Vec<VideoRecord> = items
        .iter()
        .filter(|item| is_video(item))
        .filter_map(|item| item_bvid(item).map(|bvid| VideoRecord::from_search_item(item, bvid)))
        .collect();

    info!("✅ Snapshot returned {} videos", videos.len());
    videos.into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ScriptedSearchApi;
    use serde_json::json;

    const NOW: i64 = 1_767_225_600;

    fn video(bvid: &str, pubdate: i64, play: u64) -> serde_json::Value {
        json!({
            "type": "video",
            "bvid": bvid,
            "title": format!("video {}", bvid),
            "author": "up",
            "play": play,
            "pubdate": pubdate
        })
    }

    fn params(limit: usize) -> PaginationParams {
        PaginationParams { limit, max_pages: 10, page_size: 50 }
    }

    #[test]
    fn test_time_window() {
        let window = TimeWindow::trailing_days(NOW, 7);
        assert_eq!(window.end - window.start, 7 * SECONDS_PER_DAY);
        assert!(window.includes(window.start));
        assert!(window.includes(NOW + 60));
        assert!(!window.includes(window.start - 1));
    }

    #[tokio::test]
    async fn test_early_stop_when_first_page_is_old() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new()
            .with_items(SearchOrder::Pubdate, vec![video("BV_old1", window.start - 10, 500)])
            .with_items(SearchOrder::Pubdate, vec![video("BV_new", NOW, 900)]);

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;

        assert!(result.is_empty());
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_across_pages() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new()
            .with_items(SearchOrder::Pubdate, vec![video("BV_a", NOW - 10, 100), video("BV_b", NOW - 20, 200)])
            .with_items(SearchOrder::Pubdate, vec![video("BV_a", NOW - 10, 100), video("BV_c", NOW - 30, 50)]);

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;
        let ids: Vec<&str> = result.iter().map(|v| v.bvid.as_str()).collect();

        assert_eq!(ids, vec!["BV_b", "BV_a", "BV_c"]);
        // Third request returns an empty page
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_out_of_window_video_stays_excluded() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new()
            .with_items(
                SearchOrder::Pubdate,
                vec![video("BV_a", NOW - 10, 100), video("BV_x", window.start - 10, 5000)],
            )
            .with_items(SearchOrder::Pubdate, vec![video("BV_x", NOW - 20, 5000)]);

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;
        let ids: Vec<&str> = result.iter().map(|v| v.bvid.as_str()).collect();

        assert_eq!(ids, vec!["BV_a"]);
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_results() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new()
            .with_items(SearchOrder::Pubdate, vec![video("BV_a", NOW - 10, 100)])
            .with_response(SearchOrder::Pubdate, 200, "<html>verify</html>")
            .with_items(SearchOrder::Pubdate, vec![video("BV_b", NOW - 10, 999)]);

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bvid, "BV_a");
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_ties_keep_encounter_order() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new().with_items(
            SearchOrder::Pubdate,
            vec![video("BV_1", NOW, 10), video("BV_2", NOW, 30), video("BV_3", NOW, 10)],
        );

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;
        let ids: Vec<&str> = result.iter().map(|v| v.bvid.as_str()).collect();

        assert_eq!(ids, vec!["BV_2", "BV_1", "BV_3"]);
    }

    #[tokio::test]
    async fn test_non_video_only_page_stops() {
        let window = TimeWindow::trailing_days(NOW, 7);
        let api = ScriptedSearchApi::new()
            .with_items(SearchOrder::Pubdate, vec![json!({ "type": "bili_user", "pubdate": NOW })])
            .with_items(SearchOrder::Pubdate, vec![video("BV_a", NOW, 1)]);

        let result = collect_recent_by_play(&api, "箱根驿传", window, &params(10)).await;

        assert!(result.is_empty());
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_takes_first_page_only() {
        let api = ScriptedSearchApi::new().with_items(
            SearchOrder::Stow,
            vec![video("BV_1", 0, 1), json!({ "type": "media_bangumi" }), video("BV_2", 0, 2), video("BV_3", 0, 3)],
        );

        let result = fetch_snapshot(&api, "箱根驿传", SearchOrder::Stow, 2).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].bvid, "BV_2");
        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page_size, SNAPSHOT_PAGE_SIZE);
        assert_eq!(requests[0].order, SearchOrder::Stow);
    }
}
