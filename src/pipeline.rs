/// Digest pipeline: recent pass, pause, candidate pass, scoring, report
///
/// Passes run strictly one after the other. The randomized pause between them
/// keeps request bursts under the upstream anti-automation threshold.
use anyhow::Result;
use chrono::{DateTime, Local};
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::candidates::gather_click_candidates;
use crate::collector::{collect_recent_by_play, TimeWindow};
use crate::config::{Config, CredentialStatus, PacingConfig};
use crate::report::{exclude_seen, DigestReport};
use crate::scoring::rank_by_weighted_score;
use crate::search::SearchApi;

/// Pick a pause length uniformly from the configured range
pub fn pause_duration(pacing: &PacingConfig) -> Duration {
    let min = pacing.min_pause_seconds.max(0.0);
    let max = pacing.max_pause_seconds;

    let secs = if max.is_finite() && max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

pub struct DigestPipeline {
    config: Config,
    api: Box<dyn SearchApi>,
}

impl DigestPipeline {
    pub fn new(config: Config, api: Box<dyn SearchApi>) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole digest as of `now` and write the report file.
    ///
    /// Search failures only shorten the lists; the report is always written.
    pub async fn run(&self, now: DateTime<Local>) -> Result<DigestReport> {
        let start_time = Instant::now();
        let keyword = self.config.search.keyword.as_str();
        info!("🏃 Starting digest for keyword [{}]", keyword);

        match self.config.credential_status() {
            CredentialStatus::Missing => {
                error!("❌ No cookie configured. Set BILIBILI_COOKIE in the environment or a .env file; searches will most likely fail");
            }
            CredentialStatus::Placeholder => {
                warn!("⚠️ The cookie is still the template placeholder; searches will most likely fail");
            }
            CredentialStatus::Present => {}
        }

        info!("🆕 Collecting this week's videos ranked by play count");
        let window = TimeWindow::trailing_days(now.timestamp(), self.config.recent.window_days);
        let recent = collect_recent_by_play(
            self.api.as_ref(),
            keyword,
            window,
            &self.config.recent.pagination(),
        )
        .await;

        let pause = pause_duration(&self.config.pacing);
        if !pause.is_zero() {
            info!("💤 Pausing {:.1}s before the next search pass", pause.as_secs_f64());
            tokio::time::sleep(pause).await;
        }

        info!("🔥 Gathering click-ranked candidates for weighted scoring");
        let candidates =
            gather_click_candidates(self.api.as_ref(), keyword, &self.config.candidates).await;
        let scored = rank_by_weighted_score(
            candidates,
            &self.config.scoring.weights,
            self.config.scoring.top_n,
        );
        let classics = exclude_seen(&recent, scored, self.config.scoring.classics_limit);

        let report = DigestReport::new(
            keyword,
            &now.format("%Y-%m-%d").to_string(),
            recent,
            classics,
        );
        report.write_to(&self.config.report_path()).await?;

        info!(
            "🎉 Digest completed in {:.2}s: {} recent, {} classics",
            start_time.elapsed().as_secs_f64(),
            report.recent.len(),
            report.classics.len()
        );
        Ok(report)
    }
}
