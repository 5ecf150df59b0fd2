// src/bin/dedupe_matched.rs
use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use company_match_lib::matching::duplicates::resolve_matched_artifact;
use company_match_lib::utils::env::{load_env, log_env_source};
use company_match_lib::utils::progress_bars::logging::MatchingLogger;

#[derive(Parser)]
#[command(author, version, about = "Move match-ambiguous rows of matched files into duplicate_matched files", long_about = None)]
struct DedupeArgs {
    /// Matched CSV files to review in place
    #[arg(required = true)]
    matched_paths: Vec<PathBuf>,

    /// Column to group on; the last column of each file when omitted
    #[arg(long)]
    group_column: Option<String>,
}

fn main() -> Result<()> {
    let env_file = load_env();
    env_logger::init();
    log_env_source(env_file.as_deref());
    let args = DedupeArgs::parse();

    let mut failures = 0usize;
    for path in &args.matched_paths {
        let logger = MatchingLogger::new(&path.display().to_string());
        match resolve_matched_artifact(path, args.group_column.as_deref(), &logger) {
            Ok(stats) => info!(
                "{}: {} clean rows kept, {} ambiguous rows in {} groups moved to {}",
                path.display(),
                stats.clean_rows,
                stats.ambiguous_rows,
                stats.duplicate_groups,
                stats.duplicate_path.display()
            ),
            Err(e) => {
                failures += 1;
                logger.log_error(&e.to_string());
                eprintln!("Failed to process {}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} files could not be reviewed", failures, args.matched_paths.len());
    }
    Ok(())
}
