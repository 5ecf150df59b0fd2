// src/matching/manager.rs - Running configured operations and the duplicate review pass
use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::MultiProgress;
use log::{debug, info};
use std::time::Instant;

use crate::config::{MatchingConfig, OperationConfig};
use crate::error::MatchingError;
use crate::matching::derived_inputs::generate_derived_inputs;
use crate::matching::duplicates::resolve_matched_artifact;
use crate::matching::keys::annotate_keys;
use crate::matching::matcher::match_records;
use crate::models::core::MatchPair;
use crate::models::stats_models::{
    DedupReport, OperationReport, OperationStats, OperationStatus, PipelineStats,
};
use crate::tabular::loader::load_clean_and_rename;
use crate::tabular::table::Table;
use crate::{update_detailed_progress, update_progress};
use crate::utils::progress_bars::logging::{
    log_pipeline_completion, log_pipeline_operation_completed, log_pipeline_operation_failed,
    log_pipeline_phase, log_pipeline_start, MatchingLogger,
};
use crate::utils::progress_bars::progress_callback::{bar_callback, ProgressCallback};
use crate::utils::progress_bars::progress_config::ProgressConfig;

/// Header of the matched artifact: left id, right id, left url, right url,
/// left key, right key. Names present on both sides get `_x` / `_y`.
pub fn matched_headers(op: &OperationConfig) -> Vec<String> {
    let pairs = [
        (&op.id_col1, &op.id_col2),
        (&op.url_col1, &op.url_col2),
        (&op.company_col1, &op.company_col2),
    ];
    let left_names = [&op.id_col1, &op.url_col1, &op.company_col1];
    let right_names = [&op.id_col2, &op.url_col2, &op.company_col2];

    let mut headers = Vec::with_capacity(6);
    for (left, right) in pairs {
        let left = if right_names.contains(&left) {
            format!("{}_x", left)
        } else {
            left.clone()
        };
        let right = if left_names.contains(&right) {
            format!("{}_y", right)
        } else {
            right.clone()
        };
        headers.push(left);
        headers.push(right);
    }
    headers
}

/// Column the duplicate review groups on: the right-side key, which is the
/// last column of the matched artifact.
pub fn group_column(op: &OperationConfig) -> String {
    matched_headers(op)
        .pop()
        .unwrap_or_else(|| op.company_col2.clone())
}

fn unmatched_headers(op: &OperationConfig) -> Vec<String> {
    vec![op.id_col1.clone(), op.url_col1.clone()]
}

/// Runs one comparison end to end: derived inputs, load, key extraction,
/// matching and persistence of the matched and unmatched artifacts.
pub fn run_operation(
    op: &OperationConfig,
    progress: &ProgressConfig,
    multi: Option<&MultiProgress>,
    run_id: &str,
) -> Result<OperationStats> {
    let logger = MatchingLogger::new(&op.name);
    logger.log_start(run_id, op.key_strategy.label(), &op.match_strategy.to_string());

    if let Some(derive) = &op.derive_inputs {
        match generate_derived_inputs(derive, &logger) {
            Ok(stats) => logger.log_debug(&format!(
                "Derived inputs: {} left rows, {} right rows, written: {}",
                stats.left_residue, stats.right_residue, stats.written
            )),
            // the operation still runs against whatever inputs already exist
            Err(e) => logger.log_error(&format!("Derived input generation failed: {}", e)),
        }
    }

    logger.log_phase("Loading", None);
    let left = load_clean_and_rename(
        &op.file_path1,
        &op.id_col1,
        &op.url_col1,
        op.rename_dict1.as_ref(),
        &logger,
    )
    .with_context(|| format!("loading left table {}", op.file_path1.display()))?;
    let right = load_clean_and_rename(
        &op.file_path2,
        &op.id_col2,
        &op.url_col2,
        op.rename_dict2.as_ref(),
        &logger,
    )
    .with_context(|| format!("loading right table {}", op.file_path2.display()))?;

    if left.records.is_empty() || right.records.is_empty() {
        return Err(MatchingError::EmptyInput {
            left: left.records.len(),
            right: right.records.len(),
        }
        .into());
    }

    let left_rows = left.records.len();
    let right_rows = right.records.len();

    logger.log_phase("Extracting keys", Some(op.key_strategy.label()));
    let left_bar = progress.row_progress_bar(multi, left_rows, &op.company_col1);
    let left_keyed = annotate_keys(
        left.records,
        op.key_strategy,
        &logger.clone().with_progress_bar(left_bar.clone()),
    )?;
    left_bar.finish_and_clear();

    let right_bar = progress.row_progress_bar(multi, right_rows, &op.company_col2);
    let right_keyed = annotate_keys(
        right.records,
        op.key_strategy,
        &logger.clone().with_progress_bar(right_bar.clone()),
    )?;
    right_bar.finish_and_clear();

    logger.log_phase("Matching", Some(&op.match_strategy.to_string()));
    let match_bar = progress.row_progress_bar(multi, left_rows, "matching");
    let outcome = match_records(
        &left_keyed,
        &right_keyed,
        op.match_strategy,
        &logger.clone().with_progress_bar(match_bar.clone()),
    )?;
    match_bar.finish_and_clear();

    let matched_left = outcome.matched_left_count();
    logger.log_match_results(outcome.pairs.len(), matched_left, outcome.unmatched.len());

    logger.log_phase("Saving results", None);
    let matched = Table::from_rows(
        matched_headers(op),
        outcome.pairs.iter().map(MatchPair::to_row).collect(),
    );
    let unmatched = Table::from_rows(
        unmatched_headers(op),
        outcome.unmatched.iter().map(|u| u.to_row()).collect(),
    );
    matched
        .write_csv(&op.matched_path)
        .with_context(|| format!("writing {}", op.matched_path.display()))?;
    unmatched
        .write_csv(&op.unmatched_path)
        .with_context(|| format!("writing {}", op.unmatched_path.display()))?;
    logger.log_debug(&format!(
        "Saved matched results to {} and unmatched results to {}",
        op.matched_path.display(),
        op.unmatched_path.display()
    ));

    let stats = OperationStats {
        name: op.name.clone(),
        left_rows,
        right_rows,
        left_rows_dropped: left.rows_dropped,
        right_rows_dropped: right.rows_dropped,
        pairs_matched: outcome.pairs.len(),
        left_records_matched: matched_left,
        left_records_unmatched: outcome.unmatched.len(),
        duration: logger.get_elapsed(),
    };
    logger.log_completion(&stats);
    Ok(stats)
}

/// Duplicate review over each operation's matched artifact. A failure is
/// recorded for that artifact and the pass moves on.
pub fn run_dedup_pass(operations: &[&OperationConfig]) -> Vec<DedupReport> {
    let mut reports = Vec::with_capacity(operations.len());
    for op in operations {
        let logger = MatchingLogger::new(&op.name);
        let column = group_column(op);
        logger.log_debug(&format!(
            "Processing matched output {}",
            op.matched_path.display()
        ));

        let outcome = match resolve_matched_artifact(&op.matched_path, Some(column.as_str()), &logger) {
            Ok(stats) => Ok(stats),
            Err(e) => {
                let message = format!(
                    "Failed to process operation: {}. Error: {}",
                    op.matched_path.display(),
                    e
                );
                logger.log_error(&message);
                eprintln!("{}", message);
                Err(e.to_string())
            }
        };

        reports.push(DedupReport {
            operation: op.name.clone(),
            matched_path: op.matched_path.clone(),
            outcome,
        });
    }
    reports
}

/// Runs every configured operation in order, then the duplicate review over
/// the operations that completed. One failing operation never stops the batch.
pub fn run_matching_pipeline(
    config: &MatchingConfig,
    progress: &ProgressConfig,
    skip_dedup: bool,
    run_id: &str,
) -> PipelineStats {
    let pipeline_start = Instant::now();
    let mut stats = PipelineStats::new(run_id, Utc::now().naive_utc());
    log_pipeline_start(run_id, config.operations.len(), !skip_dedup);

    let multi = progress.create_multi_progress();
    let pipeline_bar = progress.pipeline_progress_bar(multi.as_ref(), config.operations.len());
    let callback: Option<ProgressCallback> = pipeline_bar.clone().map(bar_callback);

    log_pipeline_phase("Matching", Some(&format!("{} operations", config.operations.len())));
    let matching_start = Instant::now();
    let mut completed: Vec<&OperationConfig> = Vec::new();

    let total = config.operations.len();
    for (i, op) in config.operations.iter().enumerate() {
        info!("Starting {}", op.name);
        update_detailed_progress!(callback, "Running", i + 1, total, &op.name);
        let op_start = Instant::now();

        let status = match run_operation(op, progress, multi.as_ref(), run_id) {
            Ok(op_stats) => {
                log_pipeline_operation_completed(&op.name, op_start.elapsed(), &op_stats);
                completed.push(op);
                OperationStatus::Completed(op_stats)
            }
            Err(e) => {
                let error = format!("{:#}", e);
                log_pipeline_operation_failed(&op.name, op_start.elapsed(), &error);
                eprintln!("Error in {}: {}", op.name, error);
                OperationStatus::Failed { error }
            }
        };

        stats.operations.push(OperationReport {
            name: op.name.clone(),
            status,
            duration: op_start.elapsed(),
        });
        if let Some(bar) = &pipeline_bar {
            bar.inc(1);
        }
    }
    stats.matching_time = matching_start.elapsed().as_secs_f64();

    if skip_dedup {
        debug!("Duplicate review skipped");
    } else {
        log_pipeline_phase(
            "Duplicate review",
            Some(&format!("{} matched artifacts", completed.len())),
        );
        update_progress!(callback, "Duplicate review");
        let dedup_start = Instant::now();
        stats.dedup = run_dedup_pass(&completed);
        stats.dedup_time = dedup_start.elapsed().as_secs_f64();
    }

    if let Some(bar) = &pipeline_bar {
        bar.finish_with_message("Pipeline complete");
    }
    stats.total_processing_time = pipeline_start.elapsed().as_secs_f64();
    log_pipeline_completion(&stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchingConfig;

    fn crm_to_cb() -> OperationConfig {
        MatchingConfig::default_operations().operations[0].clone()
    }

    #[test]
    fn test_matched_headers_layout() {
        assert_eq!(
            matched_headers(&crm_to_cb()),
            vec![
                "CRM_ID",
                "UUID",
                "COMPANY_WEBSITE",
                "HOMEPAGE_URL",
                "crm_company",
                "cb_company"
            ]
        );
        assert_eq!(group_column(&crm_to_cb()), "cb_company");
    }

    #[test]
    fn test_matched_headers_suffix_collisions() {
        let mut op = crm_to_cb();
        op.id_col2 = "CRM_ID".to_string();
        op.company_col1 = "company".to_string();
        op.company_col2 = "company".to_string();
        assert_eq!(
            matched_headers(&op),
            vec![
                "CRM_ID_x",
                "CRM_ID_y",
                "COMPANY_WEBSITE",
                "HOMEPAGE_URL",
                "company_x",
                "company_y"
            ]
        );
        assert_eq!(group_column(&op), "company_y");
    }
}
