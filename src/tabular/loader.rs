// src/tabular/loader.rs - Loading one side of a matching operation
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{MatchingError, MatchingResult};
use crate::models::core::Record;
use crate::tabular::table::Table;
use crate::utils::progress_bars::logging::MatchingLogger;

/// Records extracted from one source table.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub records: Vec<Record>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
}

/// Reads `path`, applies the rename map, checks that the id and url columns
/// exist and drops rows where either is null.
pub fn load_clean_and_rename(
    path: &Path,
    id_column: &str,
    url_column: &str,
    rename: Option<&BTreeMap<String, String>>,
    logger: &MatchingLogger,
) -> MatchingResult<LoadedSource> {
    let mut table = Table::read_csv(path)?;
    if table.is_empty() {
        return Err(MatchingError::EmptySource(path.to_path_buf()));
    }
    logger.log_data_loaded(&path.display().to_string(), table.len(), table.width());

    if let Some(renames) = rename.filter(|r| !r.is_empty()) {
        table.rename_columns(renames);
        logger.log_debug(&format!("Renamed columns: {:?}", table.headers()));
    }

    let id_index = table.column_index(id_column);
    let url_index = table.column_index(url_column);
    let (id_index, url_index) = match (id_index, url_index) {
        (Some(id), Some(url)) => (id, url),
        _ => {
            let missing = [(id_column, id_index), (url_column, url_index)]
                .into_iter()
                .filter(|(_, index)| index.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(MatchingError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }
    };

    let rows_loaded = table.len();
    let rows_dropped = table.retain_rows(|row| row[id_index].is_some() && row[url_index].is_some());
    logger.log_rows_dropped(rows_dropped, id_column, url_column);

    let records = table
        .rows()
        .iter()
        .filter_map(|row| match (&row[id_index], &row[url_index]) {
            (Some(id), Some(url)) => Some(Record::new(id.as_str(), url.as_str())),
            _ => None,
        })
        .collect();

    Ok(LoadedSource {
        records,
        rows_loaded,
        rows_dropped,
    })
}
