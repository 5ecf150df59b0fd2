use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

use company_match_lib::config::MatchingConfig;
use company_match_lib::matching::manager::run_matching_pipeline;
use company_match_lib::utils::env::{load_env, log_env_source};
use company_match_lib::utils::get_memory_usage;
use company_match_lib::utils::progress_bars::progress_config::{
    print_progress_env_help, ProgressConfig,
};

#[derive(Parser)]
#[command(author, version, about = "Match company records across CRM and provider exports by URL", long_about = None)]
struct Args {
    /// JSON file with the operation list (falls back to MATCHING_CONFIG, then the built-in list)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only run the named operation; repeat to run several
    #[arg(long)]
    only: Vec<String>,

    /// Skip the duplicate review pass over matched outputs
    #[arg(long)]
    skip_dedup: bool,

    /// Print the progress environment variables and exit
    #[arg(long)]
    progress_help: bool,
}

fn main() -> Result<()> {
    // .env may set RUST_LOG, so it is read before the logger starts
    let env_file = load_env();
    env_logger::init();
    log_env_source(env_file.as_deref());

    let args = Args::parse();
    if args.progress_help {
        print_progress_env_help();
        return Ok(());
    }

    info!("Starting URL matching pipeline");
    let start = Instant::now();

    let progress_config = ProgressConfig::from_env();
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );

    let mut config = MatchingConfig::load(args.config.as_deref())
        .context("Failed to load matching operations")?;
    config
        .retain_named(&args.only)
        .context("Failed to select operations")?;

    let run_id = Uuid::new_v4().to_string();
    info!(
        "Run {} started at {}",
        run_id,
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );

    let stats = run_matching_pipeline(&config, &progress_config, args.skip_dedup, &run_id);

    info!(
        "Matched {} pairs across {} operations; {} ambiguous rows quarantined",
        stats.total_pairs_matched(),
        stats.operations_completed(),
        stats.total_ambiguous_rows()
    );
    if progress_config.should_show_memory() {
        info!("Memory in use: {} MB", get_memory_usage());
    }
    if stats.operations_failed() > 0 {
        warn!(
            "{} of {} operations failed; see the log above",
            stats.operations_failed(),
            stats.operations.len()
        );
    }

    info!("URL matching process completed in {:.2?}", start.elapsed());
    Ok(())
}
