// src/utils/progress_bars/logging.rs - Operation-scoped logging helpers
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::models::stats_models::{DedupReport, OperationStats, PipelineStats};

/// Logger handed to every stage of one operation.
///
/// Lines are prefixed with the operation label so interleaved output from a
/// batch stays attributable. An attached progress bar is driven from the same
/// calls.
#[derive(Clone)]
pub struct MatchingLogger {
    operation: String,
    start_time: Instant,
    progress_bar: Option<ProgressBar>,
}

impl MatchingLogger {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start_time: Instant::now(),
            progress_bar: None,
        }
    }

    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.progress_bar = Some(bar);
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn log_start(&self, run_id: &str, key_strategy: &str, match_strategy: &str) {
        info!(
            "[{}] 🌐 🚀 Starting operation (run ID: {}, keys: {}, matching: {})",
            self.operation, run_id, key_strategy, match_strategy
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        let msg = if let Some(details) = details {
            format!(
                "[{}] 🔄 Phase: {} - {} [+{:.1}s]",
                self.operation,
                phase,
                details,
                elapsed.as_secs_f32()
            )
        } else {
            format!(
                "[{}] 🔄 Phase: {} [+{:.1}s]",
                self.operation,
                phase,
                elapsed.as_secs_f32()
            )
        };
        info!("{}", msg);

        if let Some(bar) = &self.progress_bar {
            bar.set_message(phase.to_string());
        }
    }

    pub fn log_data_loaded(&self, path: &str, rows: usize, columns: usize) {
        info!(
            "[{}] 📊 Loaded {}: {} rows x {} columns",
            self.operation, path, rows, columns
        );
    }

    pub fn log_rows_dropped(&self, dropped: usize, id_column: &str, url_column: &str) {
        if dropped > 0 {
            warn!(
                "[{}] ⚠️  Dropped {} rows with null values in {} or {}",
                self.operation, dropped, id_column, url_column
            );
        }
    }

    pub fn log_match_results(&self, pairs: usize, matched_left: usize, unmatched: usize) {
        if pairs == 0 {
            warn!(
                "[{}] ⚠️  No matches found between the two record sets",
                self.operation
            );
        } else {
            info!(
                "[{}] 🎯 Matched {} pairs covering {} left records, {} left records unmatched",
                self.operation, pairs, matched_left, unmatched
            );
        }
    }

    pub fn log_duplicate_results(&self, ambiguous: usize, groups: usize, clean: usize, column: &str) {
        info!(
            "[{}] 🔍 Found {} rows in {} duplicate groups on {}; {} rows remain clean",
            self.operation, ambiguous, groups, column, clean
        );
    }

    pub fn log_completion(&self, stats: &OperationStats) {
        info!(
            "[{}] 🎉 COMPLETED in {:.2?}: {} pairs, {} unmatched, {:.1}% of left records matched",
            self.operation,
            self.start_time.elapsed(),
            stats.pairs_matched,
            stats.left_records_unmatched,
            stats.match_rate()
        );
    }

    /// Drives the attached bar on every call but only writes a log line at
    /// milestones.
    pub fn log_progress_update(&self, current: usize, total: usize, additional_info: Option<&str>) {
        if let Some(bar) = &self.progress_bar {
            if bar.length() != Some(total as u64) {
                bar.set_length(total as u64);
            }
            bar.set_position(current as u64);
        }

        let should_log = current % 5000 == 0
            || current == total
            || (total >= 100 && current % (total / 10) == 0);

        if should_log && current > 0 && total > 0 {
            let percent = (current as f64 / total as f64) * 100.0;
            let msg = if let Some(extra) = additional_info {
                format!("Progress: {}/{} ({:.1}%) - {}", current, total, percent, extra)
            } else {
                format!("Progress: {}/{} ({:.1}%)", current, total, percent)
            };
            debug!("[{}] 📊 {}", self.operation, msg);
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] ⚠️  {}", self.operation, message);
    }

    pub fn log_error(&self, message: &str) {
        error!("[{}] ❌ {}", self.operation, message);
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {}", self.operation, message);
    }

    pub fn get_elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// Pipeline-level logging functions
pub fn log_pipeline_start(run_id: &str, operation_count: usize, dedup_enabled: bool) {
    info!("🚀 ===== URL MATCHING PIPELINE STARTING =====");
    info!("📅 Pipeline Run ID: {}", run_id);
    info!("⚙️  Configuration:");
    info!("   • {} matching operations configured", operation_count);
    info!(
        "   • Duplicate review pass: {}",
        if dedup_enabled { "enabled" } else { "disabled" }
    );
    info!("================================================");
}

pub fn log_pipeline_phase(phase: &str, details: Option<&str>) {
    let msg = if let Some(details) = details {
        format!("🔄 Pipeline Phase: {} - {}", phase, details)
    } else {
        format!("🔄 Pipeline Phase: {}", phase)
    };
    info!("{}", msg);
}

pub fn log_pipeline_operation_completed(name: &str, duration: Duration, stats: &OperationStats) {
    info!(
        "✅ {} completed in {:.2?}: {} pairs, {} unmatched",
        name, duration, stats.pairs_matched, stats.left_records_unmatched
    );
}

pub fn log_pipeline_operation_failed(name: &str, duration: Duration, error: &str) {
    error!("❌ Error in {} after {:.2?}: {}", name, duration, error);
}

pub fn log_pipeline_completion(stats: &PipelineStats) {
    info!("🎉 ===== URL MATCHING PIPELINE COMPLETED =====");
    info!("📅 Pipeline Run ID: {}", stats.run_id);
    info!("⏱️  Timing: {}", stats.timing_summary());
    info!(
        "🎯 Operations: {} completed, {} failed",
        stats.operations_completed(),
        stats.operations_failed()
    );
    info!("");
    info!("📈 Operation Breakdown:");
    for report in &stats.operations {
        match report.stats() {
            Some(s) => info!(
                "  ✅ {}: {} pairs, {} unmatched ({:.1}% matched)",
                report.name,
                s.pairs_matched,
                s.left_records_unmatched,
                s.match_rate()
            ),
            None => info!("  ❌ {}: failed", report.name),
        }
    }
    if !stats.dedup.is_empty() {
        info!("");
        info!("🔍 Duplicate Review:");
        for report in &stats.dedup {
            log_dedup_report(report);
        }
    }
    info!("===============================================");
}

fn log_dedup_report(report: &DedupReport) {
    match &report.outcome {
        Ok(s) => info!(
            "  {}: {} clean rows, {} ambiguous rows in {} groups",
            report.operation, s.clean_rows, s.ambiguous_rows, s.duplicate_groups
        ),
        Err(e) => info!("  {}: skipped ({})", report.operation, e),
    }
}
