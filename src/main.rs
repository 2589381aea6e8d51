use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hakone_digest::collector::fetch_snapshot;
use hakone_digest::report::escape_table_text;
use hakone_digest::{
    BilibiliSearchClient, Config, DigestPipeline, ScriptedSearchApi, SearchApi, SearchOrder,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Hakone Digest")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Weekly Bilibili digest of Hakone Ekiden videos")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("keyword")
                .short('k')
                .long("keyword")
                .value_name("KEYWORD")
                .help("Search keyword, overrides the configuration")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Report file to write")
        )
        .arg(
            Arg::new("fixture")
                .long("fixture")
                .value_name("FILE")
                .help("Replay recorded search responses from a JSON fixture instead of calling the API")
        )
        .arg(
            Arg::new("peek")
                .long("peek")
                .value_name("ORDER")
                .help("Only fetch the first result page in the given order (pubdate, click, scores, stow, dm, totalrank) and list it")
        )
        .arg(
            Arg::new("no-pause")
                .long("no-pause")
                .help("Skip the randomized pause between search passes")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    // Initialize logging
    let default_filter = if matches.get_flag("verbose") {
        "hakone_digest=debug,info"
    } else {
        "hakone_digest=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Pick up BILIBILI_COOKIE from a local .env file if there is one
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to read .env file: {}", e);
        }
    }

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(keyword) = matches.get_one::<String>("keyword") {
        config.search.keyword = keyword.clone();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output.report_path = Some(PathBuf::from(output));
    }
    if matches.get_flag("no-pause") {
        config.pacing.min_pause_seconds = 0.0;
        config.pacing.max_pause_seconds = 0.0;
    }
    config.validate()?;

    info!("🚀 Hakone Digest starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let api: Box<dyn SearchApi> = match matches.get_one::<String>("fixture") {
        Some(path) => {
            info!("📼 Replaying search responses from {}", path);
            Box::new(ScriptedSearchApi::from_fixture_file(&PathBuf::from(path))?)
        }
        None => Box::new(BilibiliSearchClient::new(&config.search, &config.credentials)?),
    };

    if let Some(order) = matches.get_one::<String>("peek") {
        let order: SearchOrder = order.parse()?;
        let videos = fetch_snapshot(api.as_ref(), &config.search.keyword, order, 10).await;
        for v in &videos {
            info!(
                "{} | {} | {} | {} | {}",
                v.date,
                escape_table_text(&v.title),
                v.author,
                v.counts.play,
                v.url
            );
        }
        return Ok(());
    }

    let report_path = config.report_path();
    let pipeline = DigestPipeline::new(config, api);
    pipeline.run(chrono::Local::now()).await?;

    info!("✅ Digest written to {}", report_path.display());
    Ok(())
}
