use std::sync::Arc;

use bitvec::prelude::*;

use crate::value::Value;

/// One named column of a loaded table.
///
/// Cells are stored as shared strings side by side with a null bitmap; a set
/// bit marks a padded (absent) cell whose string slot is left empty.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Cell text, one entry per row. Null rows hold `""`.
    pub data: Vec<Arc<str>>,
    /// `true` at `i` when row `i` is null.
    pub null_bitmap: BitVec,
}

impl Column {
    pub fn new(name: String) -> Self {
        Self {
            name,
            data: Vec::new(),
            null_bitmap: BitVec::new(),
        }
    }

    /// Appends a cell.
    ///
    /// Only [Value::Text] and [Value::Null] are accepted; anything else is
    /// handed back untouched in the `Err`.
    ///
    /// # Example
    /// ```
    /// # use csvql::column::Column;
    /// # use csvql::value::Value;
    /// let mut email = Column::new("email".into());
    /// email.push(Value::from("ann@example.com")).unwrap();
    /// email.push(Value::Null).unwrap();
    ///
    /// assert_eq!(email.text(0), Some("ann@example.com"));
    /// assert_eq!(email.text(1), None);
    /// ```
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        let (is_null, text) = match value {
            Value::Null => (true, Arc::from("")),
            Value::Text(text) => (false, text),
            other => return Err(other),
        };
        self.null_bitmap.push(is_null);
        self.data.push(text);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.null_bitmap.is_empty()
    }

    /// Owned cell at `row_idx`: `Value::Null` for padded cells, `None` past the end.
    pub fn get(&self, row_idx: usize) -> Option<Value> {
        let is_null = *self.null_bitmap.get(row_idx)?;
        Some(if is_null {
            Value::Null
        } else {
            Value::Text(Arc::clone(&self.data[row_idx]))
        })
    }

    /// Borrowed text of a cell; `None` for nulls and out-of-bounds indexes.
    pub fn text(&self, row_idx: usize) -> Option<&str> {
        match self.null_bitmap.get(row_idx).as_deref() {
            Some(false) => Some(&*self.data[row_idx]),
            _ => None,
        }
    }

    /// Number of non-null, non-empty cells among `rows`.
    pub fn count_present(&self, rows: &[usize]) -> usize {
        rows.iter()
            .filter(|&&row| self.text(row).is_some_and(|s| !s.is_empty()))
            .count()
    }
}
