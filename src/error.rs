use std::path::PathBuf;

use thiserror::Error;

use crate::ast::ComparisonOp;
use crate::value::Literal;

/// Raised when query text does not match the supported grammar.
///
/// Parsing is all-or-nothing: a [SyntaxError] means no query was produced.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Raised for problems found only against actual data, and for load failures.
///
/// Variants carry the available tables or columns so the query can be fixed.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Table '{name}' not found. Loaded tables: {}.", join_or_none(.loaded))]
    TableNotFound { name: String, loaded: Vec<String> },

    #[error(
        "Column '{column}' in WHERE clause does not exist. Available columns: {}.",
        .available.join(", ")
    )]
    UnknownWhereColumn {
        column: String,
        available: Vec<String>,
    },

    #[error(
        "Column '{column}' in SELECT does not exist. Available columns: {}.",
        .available.join(", ")
    )]
    UnknownSelectColumn {
        column: String,
        available: Vec<String>,
    },

    #[error(
        "Type mismatch: cannot compare non-numeric value {} with numeric literal {literal}.",
        quote_cell(.cell)
    )]
    TypeMismatch {
        cell: Option<String>,
        literal: Literal,
    },

    #[error("String comparisons only support '=' and '!='. Got operator '{op}'.")]
    UnsupportedStringOperator { op: ComparisonOp },

    #[error("Unsupported aggregate function: {function}")]
    UnsupportedAggregate { function: String },

    #[error("No columns specified in SELECT clause.")]
    NoColumns,

    #[error("CSV file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot store {value} in table '{table}': cells must be text or null")]
    InvalidCell { table: String, value: String },

    #[error("row for table '{table}' has {actual} values, expected {expected}")]
    RowWidth {
        table: String,
        expected: usize,
        actual: usize,
    },
}

/// Either kind of failure a query can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn quote_cell(cell: &Option<String>) -> String {
    match cell {
        Some(text) => format!("'{text}'"),
        None => "NULL".to_string(),
    }
}
