// src/matching/derived_inputs.rs - Residue inputs for a follow-up operation
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MatchingError, MatchingResult};
use crate::tabular::table::Table;
use crate::utils::progress_bars::logging::MatchingLogger;

/// Where the residue of an earlier operation comes from and where it goes.
///
/// Source id columns use the raw (pre-rename) header names; matched id
/// columns use the headers of the completed matched artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedInputConfig {
    pub matched_path: PathBuf,
    pub left_source: PathBuf,
    pub right_source: PathBuf,
    pub left_source_id_col: String,
    pub right_source_id_col: String,
    pub matched_left_id_col: String,
    pub matched_right_id_col: String,
    pub left_output: PathBuf,
    pub right_output: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedInputStats {
    pub left_residue: usize,
    pub right_residue: usize,
    pub written: bool,
}

fn read_non_empty(path: &Path) -> MatchingResult<Table> {
    let table = Table::read_csv(path)?;
    if table.is_empty() {
        return Err(MatchingError::EmptySource(path.to_path_buf()));
    }
    Ok(table)
}

fn require_column(table: &Table, path: &Path, column: &str) -> MatchingResult<usize> {
    table.column_index(column).ok_or_else(|| MatchingError::Schema {
        path: path.to_path_buf(),
        missing: vec![column.to_string()],
    })
}

/// Rows of `source` whose id is absent from `matched_ids`. Rows with a null
/// id are never matched, so they always stay.
fn residue(source: &Table, id_index: usize, matched: &Table, matched_index: usize) -> Table {
    let matched_ids = matched.column_set(matched_index);
    let rows = source
        .rows()
        .iter()
        .filter(|row| {
            row.get(id_index)
                .and_then(|c| c.as_deref())
                .map_or(true, |id| !matched_ids.contains(id))
        })
        .cloned()
        .collect();
    Table::from_rows(source.headers().to_vec(), rows)
}

/// Writes the left and right rows that the matched artifact did not cover.
///
/// All three tables must be non-empty. When either residue is empty nothing
/// is written and the previous outputs, if any, are left in place.
pub fn generate_derived_inputs(
    config: &DerivedInputConfig,
    logger: &MatchingLogger,
) -> MatchingResult<DerivedInputStats> {
    logger.log_phase(
        "Derived inputs",
        Some(&format!("residue of {}", config.matched_path.display())),
    );

    let matched = read_non_empty(&config.matched_path)?;
    let left = read_non_empty(&config.left_source)?;
    let right = read_non_empty(&config.right_source)?;

    let matched_left = require_column(&matched, &config.matched_path, &config.matched_left_id_col)?;
    let matched_right =
        require_column(&matched, &config.matched_path, &config.matched_right_id_col)?;
    let left_id = require_column(&left, &config.left_source, &config.left_source_id_col)?;
    let right_id = require_column(&right, &config.right_source, &config.right_source_id_col)?;

    let left_residue = residue(&left, left_id, &matched, matched_left);
    let right_residue = residue(&right, right_id, &matched, matched_right);

    let mut stats = DerivedInputStats {
        left_residue: left_residue.len(),
        right_residue: right_residue.len(),
        written: false,
    };

    if left_residue.is_empty() || right_residue.is_empty() {
        logger.log_warning("No unmatched records found for the follow-up matching inputs");
        return Ok(stats);
    }

    left_residue.write_csv(&config.left_output)?;
    right_residue.write_csv(&config.right_output)?;
    stats.written = true;
    logger.log_debug(&format!(
        "Wrote {} left rows to {} and {} right rows to {}",
        stats.left_residue,
        config.left_output.display(),
        stats.right_residue,
        config.right_output.display()
    ));

    Ok(stats)
}
