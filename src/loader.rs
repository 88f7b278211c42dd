//! Reads delimited text files into [Table]s.
//!
//! The first record is the header; every following record maps header names
//! to text values. No type inference happens here: numbers stay text until a
//! query compares them.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::error::ExecutionError;
use crate::table::Table;
use crate::value::Value;

/// Knobs for the CSV reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field separator, `,` by default.
    pub delimiter: u8,
    /// Strip leading and trailing whitespace from headers and fields.
    pub trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
        }
    }
}

/// Table name for a source path: its file name without the last extension.
pub fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads the file at `path` into a table named after it.
///
/// Records shorter than the header are padded with nulls, fields past the
/// header are dropped. A repeated header name keeps its first position and
/// takes the value of its last field.
///
/// # Errors
/// [ExecutionError::FileNotFound] if nothing exists at `path`,
/// [ExecutionError::Load] if the file cannot be read or decoded.
pub fn load_table(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table, ExecutionError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExecutionError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let load_err = |source: csv::Error| ExecutionError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(if options.trim { Trim::All } else { Trim::None })
        .from_path(path)
        .map_err(load_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(load_err)?
        .iter()
        .map(str::to_string)
        .collect();

    // header field position -> column position, collapsing repeated names
    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let slots: Vec<usize> = headers
        .iter()
        .map(|name| {
            *seen.entry(name.as_str()).or_insert_with(|| {
                columns.push(name.clone());
                columns.len() - 1
            })
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(load_err)?;
        let mut row = vec![Value::Null; columns.len()];
        for (field, &slot) in record.iter().zip(&slots) {
            row[slot] = Value::from(field);
        }
        if record.len() > slots.len() {
            warn!(
                line = ?record.position().map(|p| p.line()),
                extra = record.len() - slots.len(),
                "dropping fields beyond the header"
            );
        }
        rows.push(row);
    }

    let name = table_name_for(path);
    let table = Table::from_rows(name, columns, rows)?;
    debug!(
        table = %table.name,
        rows = table.row_count,
        columns = table.columns.len(),
        path = %path.display(),
        "loaded table"
    );
    Ok(table)
}
