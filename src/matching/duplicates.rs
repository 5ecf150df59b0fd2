// src/matching/duplicates.rs - Quarantining match-ambiguous groups
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use crate::error::{MatchingError, MatchingResult};
use crate::models::core::MatchPair;
use crate::models::stats_models::DedupStats;
use crate::tabular::table::{Row, Table};
use crate::utils::progress_bars::logging::MatchingLogger;

/// Marker substituted in a matched artifact's file name to name its sibling.
const MATCHED_MARKER: &str = "matched";
const DUPLICATE_MARKER: &str = "duplicate_matched";

/// Items split by whether their grouping value is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    /// Items whose grouping value is unique, in input order.
    pub clean: Vec<T>,
    /// Items whose grouping value occurs at least twice, grouped and ordered
    /// by that value ascending.
    pub ambiguous: Vec<T>,
    /// Number of distinct shared grouping values.
    pub groups: usize,
}

/// Partitions `items` on `key_of`. Every occurrence of a shared key is moved
/// to `ambiguous`, not just the second and later ones. Nothing is dropped.
pub fn partition_by_key<T, K, F>(items: Vec<T>, key_of: F) -> Resolution<T>
where
    K: Ord + Hash + Clone,
    F: Fn(&T) -> K,
{
    let keyed: Vec<(K, T)> = items.into_iter().map(|item| (key_of(&item), item)).collect();

    let mut counts: HashMap<K, usize> = HashMap::new();
    for (key, _) in &keyed {
        *counts.entry(key.clone()).or_insert(0) += 1;
    }
    let groups = counts.values().filter(|&&count| count >= 2).count();

    let mut clean = Vec::new();
    let mut ambiguous = Vec::new();
    for (key, item) in keyed {
        if counts.get(&key).copied().unwrap_or(0) >= 2 {
            ambiguous.push((key, item));
        } else {
            clean.push(item);
        }
    }
    // stable: rows inside a group keep their input order
    ambiguous.sort_by(|a, b| a.0.cmp(&b.0));

    Resolution {
        clean,
        ambiguous: ambiguous.into_iter().map(|(_, item)| item).collect(),
        groups,
    }
}

/// Splits in-memory pairs on the right-side key.
pub fn resolve_pairs(pairs: Vec<MatchPair>, logger: &MatchingLogger) -> Resolution<MatchPair> {
    let resolution = partition_by_key(pairs, |pair| pair.right_key.clone());
    logger.log_duplicate_results(
        resolution.ambiguous.len(),
        resolution.groups,
        resolution.clean.len(),
        "right key",
    );
    resolution
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableResolution {
    pub clean: Table,
    pub ambiguous: Table,
    pub groups: usize,
}

/// Splits a matched table on the named grouping column. Null grouping values
/// are grouped with each other and sort after every non-null value.
pub fn resolve_table(
    table: &Table,
    group_column: &str,
    logger: &MatchingLogger,
) -> MatchingResult<TableResolution> {
    let column = table.column_index(group_column).ok_or_else(|| {
        MatchingError::malformed(
            logger.operation(),
            format!("grouping column '{}' not found", group_column),
        )
    })?;

    let rows: Vec<Row> = table.rows().to_vec();
    let resolution = partition_by_key(rows, |row| match row.get(column).cloned().flatten() {
        Some(value) => (false, value),
        None => (true, String::new()),
    });

    logger.log_duplicate_results(
        resolution.ambiguous.len(),
        resolution.groups,
        resolution.clean.len(),
        group_column,
    );

    let headers = table.headers().to_vec();
    Ok(TableResolution {
        clean: Table::from_rows(headers.clone(), resolution.clean),
        ambiguous: Table::from_rows(headers, resolution.ambiguous),
        groups: resolution.groups,
    })
}

/// Sibling path for the ambiguous rows of a matched artifact:
/// `crm_cb_matched.csv` becomes `crm_cb_duplicate_matched.csv`.
pub fn duplicate_artifact_path(matched_path: &Path) -> PathBuf {
    let file_name = matched_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let duplicate_name = if file_name.contains(MATCHED_MARKER) {
        file_name.replace(MATCHED_MARKER, DUPLICATE_MARKER)
    } else {
        let stem = matched_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match matched_path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, DUPLICATE_MARKER, ext.to_string_lossy()),
            None => format!("{}_{}", stem, DUPLICATE_MARKER),
        }
    };

    matched_path.with_file_name(duplicate_name)
}

/// Reads a persisted matched table, writes its ambiguous rows to the sibling
/// duplicate artifact and rewrites the matched file with the clean rows.
///
/// `group_column` of `None` groups on the last column.
pub fn resolve_matched_artifact(
    matched_path: &Path,
    group_column: Option<&str>,
    logger: &MatchingLogger,
) -> MatchingResult<DedupStats> {
    let source_name = matched_path.display().to_string();
    let table = Table::read_csv(matched_path)
        .map_err(|e| MatchingError::malformed(source_name.as_str(), e.to_string()))?;
    logger.log_data_loaded(&source_name, table.len(), table.width());

    let group_column = match group_column {
        Some(column) => column.to_string(),
        None => table
            .headers()
            .last()
            .cloned()
            .ok_or_else(|| MatchingError::malformed(source_name.as_str(), "table has no columns"))?,
    };
    if table.column_index(&group_column).is_none() {
        return Err(MatchingError::malformed(
            source_name,
            format!("grouping column '{}' not found", group_column),
        ));
    }
    logger.log_phase("Duplicate review", Some(&format!("grouping on {}", group_column)));

    let resolution = resolve_table(&table, &group_column, logger)?;

    let duplicate_path = duplicate_artifact_path(matched_path);
    resolution.ambiguous.write_csv(&duplicate_path)?;
    logger.log_debug(&format!(
        "Saved {} grouped duplicate rows to {}",
        resolution.ambiguous.len(),
        duplicate_path.display()
    ));
    resolution.clean.write_csv(matched_path)?;
    logger.log_debug(&format!(
        "Saved {} clean rows back to {}",
        resolution.clean.len(),
        matched_path.display()
    ));

    Ok(DedupStats {
        matched_path: matched_path.to_path_buf(),
        duplicate_path,
        group_column,
        total_rows: table.len(),
        clean_rows: resolution.clean.len(),
        ambiguous_rows: resolution.ambiguous.len(),
        duplicate_groups: resolution.groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(values: &[Option<&str>]) -> Row {
        values.iter().map(|v| v.map(|s| s.to_string())).collect()
    }

    fn matched_table() -> Table {
        Table::from_rows(
            vec!["LEFT_ID".into(), "RIGHT_ID".into(), "RIGHT_KEY".into()],
            vec![
                row(&[Some("1"), Some("a"), Some("zeta.com")]),
                row(&[Some("2"), Some("b"), Some("acme.com")]),
                row(&[Some("3"), Some("c"), Some("beta.com")]),
                row(&[Some("4"), Some("d"), Some("acme.com")]),
                row(&[Some("5"), Some("e"), Some("zeta.com")]),
                row(&[Some("6"), Some("f"), None]),
            ],
        )
    }

    fn logger() -> MatchingLogger {
        MatchingLogger::new("dedup-test")
    }

    #[test]
    fn test_partition_law() {
        let table = matched_table();
        let resolution = resolve_table(&table, "RIGHT_KEY", &logger()).unwrap();

        assert_eq!(resolution.clean.len() + resolution.ambiguous.len(), table.len());
        let clean: HashSet<&Row> = resolution.clean.rows().iter().collect();
        let ambiguous: HashSet<&Row> = resolution.ambiguous.rows().iter().collect();
        assert!(clean.is_disjoint(&ambiguous));
        let all: HashSet<&Row> = table.rows().iter().collect();
        assert_eq!(clean.union(&ambiguous).copied().collect::<HashSet<_>>(), all);

        let ambiguous_keys: Vec<Option<&str>> = resolution.ambiguous.column_values(2).collect();
        assert_eq!(
            ambiguous_keys,
            vec![Some("acme.com"), Some("acme.com"), Some("zeta.com"), Some("zeta.com")]
        );
        for key in resolution.clean.column_values(2) {
            assert!(!ambiguous_keys.contains(&key));
        }
        assert_eq!(resolution.groups, 2);
    }

    #[test]
    fn test_groups_keep_input_order_and_clean_keeps_order() {
        let resolution = resolve_table(&matched_table(), "RIGHT_KEY", &logger()).unwrap();
        let ambiguous_ids: Vec<Option<&str>> = resolution.ambiguous.column_values(0).collect();
        assert_eq!(ambiguous_ids, vec![Some("2"), Some("4"), Some("1"), Some("5")]);
        let clean_ids: Vec<Option<&str>> = resolution.clean.column_values(0).collect();
        assert_eq!(clean_ids, vec![Some("3"), Some("6")]);
    }

    #[test]
    fn test_rerun_on_clean_and_ambiguous() {
        let first = resolve_table(&matched_table(), "RIGHT_KEY", &logger()).unwrap();

        let on_clean = resolve_table(&first.clean, "RIGHT_KEY", &logger()).unwrap();
        assert_eq!(on_clean.clean, first.clean);
        assert!(on_clean.ambiguous.is_empty());

        let on_ambiguous = resolve_table(&first.ambiguous, "RIGHT_KEY", &logger()).unwrap();
        assert!(on_ambiguous.clean.is_empty());
        assert_eq!(on_ambiguous.ambiguous, first.ambiguous);
    }

    #[test]
    fn test_null_group_values_sort_last() {
        let table = Table::from_rows(
            vec!["ID".into(), "KEY".into()],
            vec![
                row(&[Some("1"), None]),
                row(&[Some("2"), Some("b")]),
                row(&[Some("3"), None]),
                row(&[Some("4"), Some("b")]),
            ],
        );
        let resolution = resolve_table(&table, "KEY", &logger()).unwrap();
        let ids: Vec<Option<&str>> = resolution.ambiguous.column_values(0).collect();
        assert_eq!(ids, vec![Some("2"), Some("4"), Some("1"), Some("3")]);
    }

    #[test]
    fn test_missing_group_column_is_malformed() {
        let err = resolve_table(&matched_table(), "NOPE", &logger()).unwrap_err();
        assert!(matches!(err, MatchingError::MalformedTable { .. }));
    }

    #[test]
    fn test_resolve_pairs_on_right_key() {
        use crate::models::core::{CompanyKey, KeyedRecord, Record};
        let keyed = |id: &str, key: &str| KeyedRecord {
            record: Record::new(id, format!("http://{}", key)),
            key: CompanyKey::new(key),
        };
        let left = keyed("1", "acme.com");
        let pairs = vec![
            MatchPair::new(&left, &keyed("a", "acme.com"), 0),
            MatchPair::new(&left, &keyed("b", "acme.com"), 0),
            MatchPair::new(&keyed("2", "beta.com"), &keyed("c", "beta.com"), 0),
        ];
        let resolution = resolve_pairs(pairs, &logger());
        assert_eq!(resolution.ambiguous.len(), 2);
        assert_eq!(resolution.clean.len(), 1);
        assert_eq!(resolution.clean[0].right_id, "c");
    }

    #[test]
    fn test_duplicate_artifact_path() {
        assert_eq!(
            duplicate_artifact_path(Path::new("out/crm_cb_matched.csv")),
            PathBuf::from("out/crm_cb_duplicate_matched.csv")
        );
        assert_eq!(
            duplicate_artifact_path(Path::new("out/pairs.csv")),
            PathBuf::from("out/pairs_duplicate_matched.csv")
        );
    }

    #[test]
    fn test_resolve_matched_artifact_rewrites_files() {
        let dir = tempfile::tempdir().unwrap();
        let matched_path = dir.path().join("ops_matched.csv");
        matched_table().write_csv(&matched_path).unwrap();

        let stats = resolve_matched_artifact(&matched_path, None, &logger()).unwrap();
        assert_eq!(stats.group_column, "RIGHT_KEY");
        assert_eq!(stats.total_rows, 6);
        assert_eq!(stats.clean_rows, 2);
        assert_eq!(stats.ambiguous_rows, 4);
        assert_eq!(stats.duplicate_groups, 2);

        let clean = Table::read_csv(&matched_path).unwrap();
        assert_eq!(clean.len(), 2);
        let duplicates = Table::read_csv(&dir.path().join("ops_duplicate_matched.csv")).unwrap();
        assert_eq!(duplicates.len(), 4);
    }

    #[test]
    fn test_resolve_header_only_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let matched_path = dir.path().join("empty_matched.csv");
        std::fs::write(&matched_path, "LEFT_ID,RIGHT_ID,RIGHT_KEY\n").unwrap();

        let stats = resolve_matched_artifact(&matched_path, None, &logger()).unwrap();
        assert_eq!(stats.total_rows, 0);
        assert_eq!(stats.clean_rows, 0);
        assert_eq!(stats.ambiguous_rows, 0);
        assert_eq!(stats.duplicate_groups, 0);

        let duplicate_path = dir.path().join("empty_duplicate_matched.csv");
        assert_eq!(stats.duplicate_path, duplicate_path);
        let duplicates = Table::read_csv(&duplicate_path).unwrap();
        assert!(duplicates.is_empty());
        assert_eq!(duplicates.headers(), ["LEFT_ID", "RIGHT_ID", "RIGHT_KEY"]);
        let clean = Table::read_csv(&matched_path).unwrap();
        assert!(clean.is_empty());
        assert_eq!(clean.headers(), duplicates.headers());
    }

    #[test]
    fn test_resolve_missing_artifact_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_matched_artifact(&dir.path().join("nope_matched.csv"), None, &logger())
            .unwrap_err();
        assert!(matches!(err, MatchingError::MalformedTable { .. }));
    }
}
