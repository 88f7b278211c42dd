use std::collections::HashMap;

use crate::column::Column;
use crate::error::ExecutionError;
use crate::value::Value;

/// An in-memory table of text cells, stored column by column.
///
/// A row is addressed by its index; [Table::get_row] materializes it in
/// column order and [Table::cell] looks a single cell up by column name.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub row_count: usize,
    /// column name -> position in `columns`
    index: HashMap<String, usize>,
}

impl Table {
    /// Creates an empty table. Column names are expected to be unique; for a
    /// repeated name, lookups resolve to its first occurrence.
    pub fn new(name: String, column_names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(column_names.len());
        for (i, column) in column_names.iter().enumerate() {
            index.entry(column.clone()).or_insert(i);
        }
        let columns = column_names.into_iter().map(Column::new).collect();
        Self {
            name,
            columns,
            row_count: 0,
            index,
        }
    }

    /// Builds a table from a header and its rows.
    ///
    /// The column set is derived from the rows: a table without rows has no
    /// columns, whatever the header says.
    pub fn from_rows(
        name: String,
        header: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, ExecutionError> {
        let header = if rows.is_empty() { Vec::new() } else { header };
        let mut table = Self::new(name, header);
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    /// insert a new row
    pub fn insert(&mut self, values: Vec<Value>) -> Result<(), ExecutionError> {
        // different sizes
        if values.len() != self.columns.len() {
            return Err(ExecutionError::RowWidth {
                table: self.name.clone(),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        // check every cell before touching storage so a bad row leaves no trace
        if let Some(bad) = values
            .iter()
            .find(|v| !matches!(v, Value::Null | Value::Text(_)))
        {
            return Err(ExecutionError::InvalidCell {
                table: self.name.clone(),
                value: format!("{bad:?}"),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column
                .push(value)
                .map_err(|value| ExecutionError::InvalidCell {
                    table: self.name.clone(),
                    value: format!("{value:?}"),
                })?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get_col(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn get_row(&self, row_idx: usize) -> Option<Vec<Value>> {
        if self.row_count <= row_idx {
            return None;
        }
        self.columns
            .iter()
            .map(|col| col.get(row_idx)) // -> Option<Value>
            .collect()
    }

    /// The cell at `row_idx` in column `name`, or `None` if either is unknown.
    pub fn cell(&self, row_idx: usize, name: &str) -> Option<Value> {
        self.get_col(name)?.get(row_idx)
    }
}
