use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::candidates::CandidateParams;
use crate::collector::PaginationParams;
use crate::scoring::ScoreWeights;

/// Environment variable holding the Bilibili session cookie
pub const COOKIE_ENV: &str = "BILIBILI_COOKIE";

/// Template text left in place when nobody filled in a real cookie
const COOKIE_PLACEHOLDER: &str = "你的B站Cookie";

/// Upper bound for the pause between search passes
pub const MAX_PAUSE_SECONDS: f64 = 3600.0;

/// Configuration for the digest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search endpoint settings
    pub search: SearchConfig,

    /// Cookie and browser headers
    pub credentials: CredentialsConfig,

    /// This week's videos ranked by play count
    pub recent: RecentConfig,

    /// Click-ordered candidate pool
    pub candidates: CandidateParams,

    /// Weighted scoring of the candidate pool
    pub scoring: ScoringConfig,

    /// Pause between the two collection passes
    pub pacing: PacingConfig,

    /// Report output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search keyword
    pub keyword: String,

    /// Search endpoint URL
    pub api_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Session cookie; falls back to `BILIBILI_COOKIE`
    pub cookie: Option<String>,

    pub user_agent: String,

    pub referer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentConfig {
    /// Length of the trailing time window in days
    pub window_days: i64,

    /// Maximum number of videos kept
    pub limit: usize,

    pub max_pages: u32,

    pub page_size: u32,
}

impl RecentConfig {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            max_pages: self.max_pages,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,

    /// How many scored candidates to keep before de-duplication
    pub top_n: usize,

    /// How many classics end up in the report
    pub classics_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_pause_seconds: f64,
    pub max_pause_seconds: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report file; defaults to `<keyword>_report.md` in the working directory
    pub report_path: Option<PathBuf>,
}

/// What we know about the configured cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Missing,
    Placeholder,
    Present,
}

impl Config {
    /// Load configuration from the first config file found, else from the environment
    pub fn load() -> Result<Self> {
        let config_paths = [
            "hakone-digest.toml",
            "config/hakone-digest.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::load_from(Path::new(path)) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(keyword) = std::env::var("HAKONE_DIGEST_KEYWORD") {
            if !keyword.trim().is_empty() {
                self.search.keyword = keyword.trim().to_string();
            }
        }

        if let Ok(output) = std::env::var("HAKONE_DIGEST_OUTPUT") {
            self.output.report_path = Some(PathBuf::from(output));
        }

        self.fill_cookie(std::env::var(COOKIE_ENV).ok());
    }

    /// Use `env_cookie` when the configured cookie is absent or blank
    fn fill_cookie(&mut self, env_cookie: Option<String>) {
        let cookie_blank = self
            .credentials
            .cookie
            .as_deref()
            .map_or(true, |cookie| cookie.trim().is_empty());
        if cookie_blank && env_cookie.is_some() {
            self.credentials.cookie = env_cookie;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.keyword.trim().is_empty() {
            return Err(anyhow!("search keyword must not be empty"));
        }

        url::Url::parse(&self.search.api_url)
            .with_context(|| format!("Invalid search API URL: {}", self.search.api_url))?;

        if self.search.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        if self.recent.window_days <= 0 {
            return Err(anyhow!("window_days must be greater than 0"));
        }

        if self.recent.page_size == 0 || self.candidates.page_size == 0 {
            return Err(anyhow!("page_size must be greater than 0"));
        }

        self.scoring.weights.validate()?;

        let pacing = &self.pacing;
        if !(pacing.min_pause_seconds >= 0.0
            && pacing.min_pause_seconds <= pacing.max_pause_seconds
            && pacing.max_pause_seconds <= MAX_PAUSE_SECONDS)
        {
            return Err(anyhow!(
                "pause range must satisfy 0 <= min <= max <= {} (got {} - {})",
                MAX_PAUSE_SECONDS,
                pacing.min_pause_seconds,
                pacing.max_pause_seconds
            ));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Report file location
    pub fn report_path(&self) -> PathBuf {
        self.output
            .report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_report.md", self.search.keyword)))
    }

    pub fn credential_status(&self) -> CredentialStatus {
        match self.credentials.cookie.as_deref().map(str::trim) {
            None | Some("") => CredentialStatus::Missing,
            Some(cookie) if cookie.contains(COOKIE_PLACEHOLDER) => CredentialStatus::Placeholder,
            Some(_) => CredentialStatus::Present,
        }
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Hakone Digest Configuration:\n\
            - Keyword: {}\n\
            - Window: {} days, {} pages x {}\n\
            - Candidates: {} over {} pages x {}\n\
            - Weights: click {:.2} / scores {:.2} / stow {:.2}\n\
            - Pause: {:.1}-{:.1}s\n\
            - Report: {}",
            self.search.keyword,
            self.recent.window_days,
            self.recent.max_pages,
            self.recent.page_size,
            self.candidates.candidate_count,
            self.candidates.max_pages,
            self.candidates.page_size,
            self.scoring.weights.click,
            self.scoring.weights.scores,
            self.scoring.weights.stow,
            self.pacing.min_pause_seconds,
            self.pacing.max_pause_seconds,
            self.report_path().display()
        )
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keyword: "箱根驿传".to_string(),
            api_url: "https://api.bilibili.com/x/web-interface/search/type".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            referer: "https://search.bilibili.com/".to_string(),
        }
    }
}

impl Default for RecentConfig {
    fn default() -> Self {
        let pagination = PaginationParams::default();
        Self {
            window_days: 7,
            limit: pagination.limit,
            max_pages: pagination.max_pages,
            page_size: pagination.page_size,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            top_n: 10,
            classics_limit: 5,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_pause_seconds: 5.0,
            max_pause_seconds: 8.0,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.config.search.keyword = keyword.to_string();
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.config.search.api_url = api_url.to_string();
        self
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.config.credentials.cookie = Some(cookie.to_string());
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.config.scoring.weights = weights;
        self
    }

    pub fn with_pause(mut self, min_seconds: f64, max_seconds: f64) -> Self {
        self.config.pacing.min_pause_seconds = min_seconds;
        self.config.pacing.max_pause_seconds = max_seconds;
        self
    }

    pub fn with_report_path(mut self, path: PathBuf) -> Self {
        self.config.output.report_path = Some(path);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.keyword, "箱根驿传");
        assert_eq!(config.search.request_timeout_seconds, 10);
        assert_eq!(config.recent.window_days, 7);
        assert_eq!(config.recent.limit, 10);
        assert_eq!(config.candidates.candidate_count, 20);
        assert_eq!(config.scoring.top_n, 10);
        assert_eq!(config.scoring.classics_limit, 5);
        assert_eq!(config.report_path(), PathBuf::from("箱根驿传_report.md"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_keyword("出云驿传")
            .with_cookie("SESSDATA=abc")
            .with_pause(0.0, 0.0)
            .build();

        assert_eq!(config.search.keyword, "出云驿传");
        assert_eq!(config.credential_status(), CredentialStatus::Present);
        assert_eq!(config.pacing.max_pause_seconds, 0.0);
        assert_eq!(config.report_path(), PathBuf::from("出云驿传_report.md"));
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(ConfigBuilder::new().with_api_url("not a url").build().validate().is_err());
        assert!(ConfigBuilder::new().with_pause(8.0, 5.0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_pause(5.0, f64::INFINITY).build().validate().is_err());
        assert!(ConfigBuilder::new().with_pause(1e30, 1e30).build().validate().is_err());
        assert!(ConfigBuilder::new()
            .with_pause(0.0, MAX_PAUSE_SECONDS)
            .build()
            .validate()
            .is_ok());
        assert!(ConfigBuilder::new()
            .with_weights(ScoreWeights::new(-0.1, 0.5, 0.6))
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn test_credential_status() {
        let mut config = Config::default();
        config.credentials.cookie = None;
        assert_eq!(config.credential_status(), CredentialStatus::Missing);

        config.credentials.cookie = Some("  ".to_string());
        assert_eq!(config.credential_status(), CredentialStatus::Missing);

        config.credentials.cookie = Some("你的B站Cookie".to_string());
        assert_eq!(config.credential_status(), CredentialStatus::Placeholder);
    }

    #[test]
    fn test_blank_cookie_takes_env_value() {
        let mut config: Config = toml::from_str(
            r#"
            [credentials]
            cookie = ""
            "#,
        )
        .unwrap();
        config.fill_cookie(Some("SESSDATA=from-env".to_string()));
        assert_eq!(config.credentials.cookie.as_deref(), Some("SESSDATA=from-env"));
        assert_eq!(config.credential_status(), CredentialStatus::Present);

        let mut config = ConfigBuilder::new().with_cookie("SESSDATA=from-file").build();
        config.fill_cookie(Some("SESSDATA=from-env".to_string()));
        assert_eq!(config.credentials.cookie.as_deref(), Some("SESSDATA=from-file"));
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [search]
            keyword = "全日本大学驿传"

            [recent]
            limit = 5
            window_days = 3

            [scoring.weights]
            click = 1.0
            scores = 0.0
            stow = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.search.keyword, "全日本大学驿传");
        assert_eq!(config.search.request_timeout_seconds, 10);
        assert_eq!(config.recent.window_days, 3);
        assert_eq!(config.recent.limit, 5);
        assert_eq!(config.recent.max_pages, 10);
        assert_eq!(config.scoring.weights.click, 1.0);
        assert_eq!(config.pacing.min_pause_seconds, 5.0);
    }
}
