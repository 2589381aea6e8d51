use chrono::{DateTime, Local};
use hakone_digest::{
    collect_recent_by_play, ConfigBuilder, DigestPipeline, PaginationParams, ScriptedSearchApi,
    SearchOrder, TimeWindow,
};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::fs;

/// 2026-01-01 00:00:00 UTC
const NOW: i64 = 1_767_225_600;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/search_pages.json")
}

fn now_local() -> DateTime<Local> {
    DateTime::from_timestamp(NOW, 0).unwrap().with_timezone(&Local)
}

#[tokio::test]
async fn test_recent_collection_from_fixture() {
    let api = ScriptedSearchApi::from_fixture_file(&fixture_path()).unwrap();
    let window = TimeWindow::trailing_days(NOW, 7);
    let params = PaginationParams { limit: 3, max_pages: 10, page_size: 50 };

    let recent = collect_recent_by_play(&api, "箱根驿传", window, &params).await;

    let ids: Vec<&str> = recent.iter().map(|v| v.bvid.as_str()).collect();
    assert_eq!(ids, vec!["BV1wk4y1A7aa", "BV1wk4y1A7cc", "BV1wk4y1A7dd"]);

    let plays: Vec<u64> = recent.iter().map(|v| v.counts.play).collect();
    assert_eq!(plays, vec![32_000, 12_345, 11_000]);
    assert!(plays.windows(2).all(|w| w[0] >= w[1]));

    assert_eq!(recent[0].title, "第102回箱根驿传往路全程");
    // Page 3 is empty, which ends pagination
    assert_eq!(api.requests().len(), 3);
}

#[tokio::test]
async fn test_full_digest_from_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("digest.md");

    let mut config = ConfigBuilder::new()
        .with_cookie("SESSDATA=test")
        .with_pause(0.0, 0.0)
        .with_report_path(report_path.clone())
        .build();
    config.recent.limit = 3;

    let api = ScriptedSearchApi::from_fixture_file(&fixture_path()).unwrap();
    let pipeline = DigestPipeline::new(config, Box::new(api));

    let report = pipeline.run(now_local()).await.unwrap();

    let recent_ids: Vec<&str> = report.recent.iter().map(|v| v.bvid.as_str()).collect();
    assert_eq!(recent_ids, vec!["BV1wk4y1A7aa", "BV1wk4y1A7cc", "BV1wk4y1A7dd"]);

    // BV1wk4y1A7aa is also a click candidate but only appears in the recent table
    let classic_ids: Vec<&str> = report.classics.iter().map(|v| v.bvid.as_str()).collect();
    assert_eq!(classic_ids, vec!["BV1old000001", "BV1old000003", "BV1old000002"]);
    assert!((report.classics[0].weighted_score.unwrap() - 1.0).abs() < 1e-9);

    let markdown = fs::read_to_string(&report_path).await.unwrap();
    assert_eq!(markdown, report.render_markdown());
    assert_eq!(markdown.matches("BV1wk4y1A7aa").count(), 1);
    assert!(markdown.contains("驿传名场面&#124;十大逆转"));
    assert!(markdown.contains(&format!("({})", now_local().format("%Y-%m-%d"))));
    assert!(markdown.contains("**3** 个新视频和 **3** 个经典回顾"));
}

#[tokio::test]
async fn test_digest_survives_blocked_api() {
    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("digest.md");

    let config = ConfigBuilder::new()
        .with_pause(0.0, 0.0)
        .with_report_path(report_path.clone())
        .build();

    let api = ScriptedSearchApi::new()
        .with_response(SearchOrder::Pubdate, 200, r#"{"code":-412,"message":"请求被拦截"}"#)
        .with_response(SearchOrder::Click, 200, "<!DOCTYPE html><html>captcha</html>");
    let pipeline = DigestPipeline::new(config, Box::new(api));

    let report = pipeline.run(now_local()).await.unwrap();

    assert!(report.recent.is_empty());
    assert!(report.classics.is_empty());

    let markdown = fs::read_to_string(&report_path).await.unwrap();
    assert!(markdown.contains("| - | 获取失败或无数据 | - | - | - |"));
    assert!(markdown.contains("**0** 个新视频和 **0** 个经典回顾"));
}
