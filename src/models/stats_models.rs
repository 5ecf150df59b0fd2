// src/models/stats_models.rs
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::Duration;

/// Counters for one completed source-pair comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStats {
    pub name: String,
    pub left_rows: usize,
    pub right_rows: usize,
    pub left_rows_dropped: usize,
    pub right_rows_dropped: usize,
    pub pairs_matched: usize,
    pub left_records_matched: usize,
    pub left_records_unmatched: usize,
    pub duration: Duration,
}

impl OperationStats {
    pub fn match_rate(&self) -> f64 {
        if self.left_rows == 0 {
            0.0
        } else {
            self.left_records_matched as f64 / self.left_rows as f64 * 100.0
        }
    }
}

/// Counters for one duplicate-review pass over a matched artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupStats {
    pub matched_path: PathBuf,
    pub duplicate_path: PathBuf,
    pub group_column: String,
    pub total_rows: usize,
    pub clean_rows: usize,
    pub ambiguous_rows: usize,
    pub duplicate_groups: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Completed(OperationStats),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    pub name: String,
    pub status: OperationStatus,
    pub duration: Duration,
}

impl OperationReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OperationStatus::Completed(_))
    }

    pub fn stats(&self) -> Option<&OperationStats> {
        match &self.status {
            OperationStatus::Completed(stats) => Some(stats),
            OperationStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DedupReport {
    pub operation: String,
    pub matched_path: PathBuf,
    pub outcome: Result<DedupStats, String>,
}

#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub operations: Vec<OperationReport>,
    pub dedup: Vec<DedupReport>,
    pub matching_time: f64,
    pub dedup_time: f64,
    pub total_processing_time: f64,
}

impl PipelineStats {
    pub fn new(run_id: impl Into<String>, run_timestamp: NaiveDateTime) -> Self {
        Self {
            run_id: run_id.into(),
            run_timestamp,
            operations: Vec::new(),
            dedup: Vec::new(),
            matching_time: 0.0,
            dedup_time: 0.0,
            total_processing_time: 0.0,
        }
    }

    pub fn operations_completed(&self) -> usize {
        self.operations.iter().filter(|r| r.is_success()).count()
    }

    pub fn operations_failed(&self) -> usize {
        self.operations.len() - self.operations_completed()
    }

    pub fn total_pairs_matched(&self) -> usize {
        self.operations
            .iter()
            .filter_map(|r| r.stats())
            .map(|s| s.pairs_matched)
            .sum()
    }

    pub fn total_ambiguous_rows(&self) -> usize {
        self.dedup
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|s| s.ambiguous_rows)
            .sum()
    }

    /// One-line timing report: UTC start, then seconds spent per phase.
    pub fn timing_summary(&self) -> String {
        format!(
            "started {} UTC; matching {:.2}s, duplicate review {:.2}s, total {:.2}s",
            self.run_timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.matching_time,
            self.dedup_time,
            self.total_processing_time
        )
    }
}
