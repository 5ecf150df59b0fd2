// src/tabular/table.rs - Header-addressed CSV tables with nullable cells
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{MatchingError, MatchingResult};

/// Cell contents treated as missing when reading, matching what spreadsheet
/// exports and dataframe tooling write for nulls.
const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub type Row = Vec<Option<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Appends a row, padding with nulls or truncating to the header width.
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(column).and_then(|c| c.as_deref()))
    }

    /// Non-null values of a column, for membership tests.
    pub fn column_set(&self, column: usize) -> HashSet<&str> {
        self.column_values(column).flatten().collect()
    }

    /// Renames headers in place; names absent from the table are ignored.
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) {
        for header in self.headers.iter_mut() {
            if let Some(new_name) = renames.get(header.as_str()) {
                *header = new_name.clone();
            }
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    pub fn read_csv(path: &Path) -> MatchingResult<Table> {
        if !path.exists() {
            return Err(MatchingError::MissingFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut table = Table::new(headers);

        for result in reader.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|cell| {
                    if NULL_MARKERS.contains(&cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }

    /// Writes the table with a header line; nulls become empty cells.
    pub fn write_csv(&self, path: &Path) -> MatchingResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_read_csv_nulls_and_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "ID,WEBSITE,NAME").unwrap();
        writeln!(file, "1,http://acme.com,Acme").unwrap();
        writeln!(file, "2,,Beta").unwrap();
        writeln!(file, "3,NULL").unwrap();
        drop(file);

        let table = Table::read_csv(&path).unwrap();
        assert_eq!(table.headers(), &["ID", "WEBSITE", "NAME"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 1), Some("http://acme.com"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(2, 1), None);
        assert_eq!(table.cell(2, 2), None);
    }

    #[test]
    fn test_read_missing_file() {
        let err = Table::read_csv(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, MatchingError::MissingFile(_)));
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let table = Table::from_rows(
            headers(&["a", "b"]),
            vec![
                vec![Some("x".to_string()), None],
                vec![Some("y, with comma".to_string()), Some("z".to_string())],
            ],
        );
        table.write_csv(&path).unwrap();

        let read_back = Table::read_csv(&path).unwrap();
        assert_eq!(read_back, table);
    }

    #[test]
    fn test_rename_and_retain() {
        let mut table = Table::from_rows(
            headers(&["ID", "URL"]),
            vec![
                vec![Some("1".to_string()), Some("a.com".to_string())],
                vec![Some("2".to_string()), None],
            ],
        );
        let mut renames = BTreeMap::new();
        renames.insert("ID".to_string(), "CRM_ID".to_string());
        renames.insert("MISSING".to_string(), "IGNORED".to_string());
        table.rename_columns(&renames);
        assert_eq!(table.column_index("CRM_ID"), Some(0));
        assert_eq!(table.column_index("ID"), None);

        let dropped = table.retain_rows(|row| row[1].is_some());
        assert_eq!(dropped, 1);
        assert_eq!(table.len(), 1);
    }
}
