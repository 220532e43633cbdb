use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// An ordered table of source rows with normalized headers.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Strip a UTF-8 BOM and collapse internal whitespace in a header cell.
fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

impl RowSet {
    /// Read a CSV export. The first non-empty record is the header row;
    /// short records are padded so every row has one cell per header.
    pub fn read_csv(path: &Path) -> Result<Self, IngestError> {
        let read_error = |source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(read_error)?;
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            match &headers {
                None => {
                    headers = Some(record.iter().map(normalize_header).collect());
                }
                Some(header_row) => {
                    let mut row = Vec::with_capacity(header_row.len());
                    for idx in 0..header_row.len() {
                        row.push(normalize_cell(record.get(idx).unwrap_or("")));
                    }
                    rows.push(row);
                }
            }
        }
        let headers = headers.unwrap_or_default();
        debug!(
            path = %path.display(),
            columns = headers.len(),
            rows = rows.len(),
            "csv table loaded"
        );
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the first `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            headers: &self.headers,
            cells,
            index,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// One source row; field access is by normalized column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
    index: usize,
}

impl<'a> Row<'a> {
    /// The trimmed cell under `column`, or `None` when absent or blank.
    pub fn value(&self, column: &str) -> Option<&'a str> {
        let position = self.headers.iter().position(|header| header == column)?;
        let cell = self.cells.get(position)?.trim();
        if cell.is_empty() { None } else { Some(cell) }
    }

    /// Spreadsheet line number (header is line 1), used in messages.
    pub fn line_number(&self) -> usize {
        self.index + 2
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_first_row_becomes_headers() {
        let file = write_csv("Nome,Data\nMaria,2024-01-01\nJoão,2024-02-02\n");
        let table = RowSet::read_csv(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.rows().next().unwrap();
        assert_eq!(first.value("Nome"), Some("Maria"));
        assert_eq!(first.value("Data"), Some("2024-01-01"));
    }

    #[test]
    fn test_bom_and_whitespace_stripped_from_headers() {
        let file = write_csv("\u{feff} ID  paciente ,Nome\n1,Maria\n");
        let table = RowSet::read_csv(file.path()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.value("ID paciente"), Some("1"));
    }

    #[test]
    fn test_blank_cells_and_short_rows_read_as_absent() {
        let file = write_csv("A,B,C\n1,,\n2\n");
        let table = RowSet::read_csv(file.path()).unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].value("B"), None);
        assert_eq!(rows[1].value("A"), Some("2"));
        assert_eq!(rows[1].value("C"), None);
    }

    #[test]
    fn test_empty_records_skipped_and_line_numbers_stable() {
        let table = RowSet::from_parts(
            vec!["A".to_string()],
            vec![vec!["x".to_string()], vec!["y".to_string()]],
        );
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].line_number(), 2);
        assert_eq!(rows[1].line_number(), 3);
    }

    #[test]
    fn test_truncate_limits_rows() {
        let file = write_csv("A\n1\n2\n3\n");
        let mut table = RowSet::read_csv(file.path()).unwrap();
        table.truncate(2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_column_is_none() {
        let file = write_csv("A\n1\n");
        let table = RowSet::read_csv(file.path()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.value("Missing"), None);
    }
}
