/// Markdown digest assembly
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::video::VideoRecord;

const EMPTY_CLASSICS_ROW: &str = "| - | 获取失败或无数据 | - | - | - |";

/// Drop scored videos already listed among the recent ones, keeping at most `limit`
pub fn exclude_seen(recent: &[VideoRecord], scored: Vec<VideoRecord>, limit: usize) -> Vec<VideoRecord> {
    let recent_ids: HashSet<&str> = recent.iter().map(|v| v.bvid.as_str()).collect();

    scored
        .into_iter()
        .filter(|v| !recent_ids.contains(v.bvid.as_str()))
        .take(limit)
        .collect()
}

/// Make a title safe to place inside a markdown table cell
pub fn escape_table_text(text: &str) -> String {
    text.replace('|', "&#124;")
        .replace('\n', " ")
        .replace('\r', " ")
}

/// The weekly digest: this week's most played videos plus weighted-score classics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    pub keyword: String,
    /// Report date, `YYYY-MM-DD`
    pub date: String,
    pub recent: Vec<VideoRecord>,
    pub classics: Vec<VideoRecord>,
}

impl DigestReport {
    pub fn new(keyword: &str, date: &str, recent: Vec<VideoRecord>, classics: Vec<VideoRecord>) -> Self {
        Self {
            keyword: keyword.to_string(),
            date: date.to_string(),
            recent,
            classics,
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# 🎽 {}周报 ({})", self.keyword, self.date));
        lines.push(format!(
            "本周为您汇总了 **{}** 个新视频和 **{}** 个经典回顾。\n",
            self.recent.len(),
            self.classics.len()
        ));

        lines.push("## 🆕 本周热门发布 (按播放量排序)".to_string());
        lines.push("| 发布日期 | 标题 | UP主 | 播放量 |".to_string());
        lines.push("|---|---|---|---|".to_string());
        for v in &self.recent {
            lines.push(format!(
                "| {} | [{}]({}) | {} | {} |",
                v.date,
                escape_table_text(&v.title),
                v.url,
                v.author,
                v.counts.play
            ));
        }

        lines.push("\n## 🔥 经典/热门 (基于 click/scores/stow 加权排序)".to_string());
        lines.push("| 发布日期 | 标题 | UP主 | 播放量 | 得分 |".to_string());
        lines.push("|---|---|---|---|---|".to_string());
        if self.classics.is_empty() {
            lines.push(EMPTY_CLASSICS_ROW.to_string());
        }
        for v in &self.classics {
            let score = v
                .weighted_score
                .map(|s| format!("{:.3}", s))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "| {} | [{}]({}) | {} | {} | {} |",
                v.date,
                escape_table_text(&v.title),
                v.url,
                v.author,
                v.counts.play,
                score
            ));
        }

        lines.join("\n")
    }

    /// Write the rendered report, replacing any existing file
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(path, self.render_markdown())
            .await
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        info!("📝 Wrote digest report to: {}", path.display());
        Ok(())
    }
}
