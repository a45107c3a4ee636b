//! Tabular file loading: CSV/TSV and JSON into a column-named string table.
//!
//! Uploaded files only need to carry a handful of named columns, so every cell
//! is kept as a string and typed conversion happens in the callers.

use crate::error::{InputError, TableKind};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported input layouts, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Json,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("tsv") => Ok(TableFormat::Tsv),
            Some("json") => Ok(TableFormat::Json),
            _ => Err(InputError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Column-named rows of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve the index of every required column, reporting all missing ones at once.
    pub fn require_columns(
        &self,
        kind: TableKind,
        required: &[&'static str],
    ) -> Result<Vec<usize>, InputError> {
        let mut indices = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for name in required {
            match self.column_index(name) {
                Some(idx) => indices.push(idx),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(InputError::MissingColumns {
                kind,
                required: required.to_vec(),
                missing,
            })
        }
    }

    /// Cell value, empty when the row is shorter than the header.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Load a table from disk, picking the decoder from the file extension.
pub fn load_table(path: &Path) -> Result<RecordTable, InputError> {
    let format = TableFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_table(&content, format, path)?;
    debug!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.rows.len(),
        "Loaded table"
    );
    Ok(table)
}

/// Decode already-read content. `origin` is only used for error messages.
pub fn parse_table(
    content: &str,
    format: TableFormat,
    origin: &Path,
) -> Result<RecordTable, InputError> {
    let content = content.trim_start_matches('\u{feff}');
    match format {
        TableFormat::Csv => parse_delimited(content, b',', origin),
        TableFormat::Tsv => parse_delimited(content, b'\t', origin),
        TableFormat::Json => parse_json(content, origin),
    }
}

fn parse_delimited(content: &str, delimiter: u8, origin: &Path) -> Result<RecordTable, InputError> {
    let csv_error = |source: csv::Error| InputError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RecordTable::new(columns, rows))
}

fn parse_json(content: &str, origin: &Path) -> Result<RecordTable, InputError> {
    let value: Value = serde_json::from_str(content).map_err(|source| InputError::Json {
        path: origin.to_path_buf(),
        source,
    })?;
    let shape_error = |detail: String| InputError::UnexpectedShape {
        path: origin.to_path_buf(),
        detail,
    };

    match value {
        Value::Array(records) => records_to_table(records).map_err(shape_error),
        Value::Object(columns) => columns_to_table(columns).map_err(shape_error),
        other => Err(shape_error(format!(
            "expected an array of records or an object of columns, found {}",
            json_kind(&other)
        ))),
    }
}

/// `[{"id": "S1", "description": "..."}, ...]`
fn records_to_table(records: Vec<Value>) -> Result<RecordTable, String> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        let Value::Object(map) = record else {
            return Err(format!("record {} is {}, expected an object", idx, json_kind(&record)));
        };
        for key in map.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(map);
    }

    let rows = objects
        .iter()
        .map(|map| {
            columns
                .iter()
                .map(|c| map.get(c).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(RecordTable::new(columns, rows))
}

/// `{"id": {"0": "S1", ...}, ...}` (pandas default) or `{"id": ["S1", ...], ...}`.
fn columns_to_table(columns: Map<String, Value>) -> Result<RecordTable, String> {
    let mut names = Vec::with_capacity(columns.len());
    let mut cells: Vec<Vec<(String, String)>> = Vec::with_capacity(columns.len());

    for (name, column) in columns {
        let entries = match column {
            Value::Array(values) => values
                .iter()
                .enumerate()
                .map(|(idx, v)| (idx.to_string(), cell_text(v)))
                .collect(),
            Value::Object(by_index) => by_index
                .iter()
                .map(|(idx, v)| (idx.clone(), cell_text(v)))
                .collect(),
            other => {
                return Err(format!(
                    "column '{}' is {}, expected an array or an index object",
                    name,
                    json_kind(&other)
                ))
            }
        };
        names.push(name);
        cells.push(entries);
    }

    // Rows cover every index label of every column, numerically when they are numbers.
    // A label missing from a column leaves an empty cell.
    let mut row_labels: Vec<String> = cells
        .iter()
        .flat_map(|entries| entries.iter().map(|(label, _)| label.clone()))
        .collect();
    row_labels.sort_by_key(|label| (label.parse::<u64>().unwrap_or(u64::MAX), label.clone()));
    row_labels.dedup();

    let rows = row_labels
        .iter()
        .map(|label| {
            cells
                .iter()
                .map(|entries| {
                    entries
                        .iter()
                        .find(|(l, _)| l == label)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(RecordTable::new(names, rows))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Path used in error messages for content that did not come from disk.
pub fn inline_origin() -> PathBuf {
    PathBuf::from("<inline>")
}
