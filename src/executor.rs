use tracing::debug;

use crate::ast::{Aggregate, ComparisonOp, ParsedQuery, WILDCARD, WhereClause};
use crate::database::Database;
use crate::error::ExecutionError;
use crate::table::Table;
use crate::value::{Literal, Value};

/// Represents the result of a successful `SELECT` query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The names of the columns included in the result set.
    pub columns: Vec<String>,
    /// The rows, each one aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// No columns and no rows, the result of `SELECT *` over zero rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Looks a cell up by row index and column name.
    pub fn value(&self, row_idx: usize, column: &str) -> Option<&Value> {
        let col_idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row_idx)?.get(col_idx)
    }
}

/// Runs a parsed query against the tables of `db`.
///
/// The pipeline is strictly ordered:
/// 1. **Resolves** the table by exact name.
/// 2. **Filters** rows with the `WHERE` clause, keeping table order.
/// 3. **Aggregates** (`COUNT`) or **projects** the surviving rows.
///
/// Any failure aborts the whole evaluation; there are no partial results.
///
/// # Errors
/// Returns an [ExecutionError] if:
/// - The table is not loaded.
/// - A `WHERE` or `SELECT` column does not exist.
/// - A cell cannot be compared with a numeric literal.
/// - A text literal is used with an ordering operator.
/// - The aggregate function is not `COUNT`.
pub fn evaluate(query: &ParsedQuery, db: &Database) -> Result<QueryResult, ExecutionError> {
    let table = db
        .get_table(&query.table)
        .ok_or_else(|| ExecutionError::TableNotFound {
            name: query.table.clone(),
            loaded: db.list_tables(),
        })?;

    let rows = filter_rows(table, query.where_clause.as_ref())?;
    debug!(
        table = %table.name,
        matched = rows.len(),
        total = table.row_count,
        "filtered rows"
    );

    match &query.aggregate {
        Some(aggregate) => aggregate_rows(table, aggregate, &rows),
        None => project_rows(table, query, &rows),
    }
}

/// Returns the indexes of the rows satisfying `where_clause`, in table order.
fn filter_rows(
    table: &Table,
    where_clause: Option<&WhereClause>,
) -> Result<Vec<usize>, ExecutionError> {
    let Some(where_clause) = where_clause else {
        return Ok((0..table.row_count).collect());
    };

    let column = table.get_col(&where_clause.column).ok_or_else(|| {
        ExecutionError::UnknownWhereColumn {
            column: where_clause.column.clone(),
            available: table.column_names(),
        }
    })?;

    let mut matched = Vec::new();
    for row in 0..table.row_count {
        if compare_cell(column.text(row), where_clause.op, &where_clause.value)? {
            matched.push(row);
        }
    }
    Ok(matched)
}

/// Compares one cell against a `WHERE` literal.
///
/// - Numeric literals: the cell text must parse as a float, integers are
///   widened to `f64`. Any operator.
/// - Text literals: verbatim comparison, `=` and `!=` only.
///
/// A null cell compares as empty text.
fn compare_cell(
    cell: Option<&str>,
    op: ComparisonOp,
    literal: &Literal,
) -> Result<bool, ExecutionError> {
    let text = cell.unwrap_or("");
    match (literal, op) {
        (Literal::Text(expected), ComparisonOp::Eq | ComparisonOp::NotEq) => {
            Ok(apply_operator(text, op, expected.as_str()))
        }
        (Literal::Text(_), op) => Err(ExecutionError::UnsupportedStringOperator { op }),
        (Literal::Integer(i), op) => Ok(apply_operator(
            &parse_numeric_cell(cell, literal)?,
            op,
            &(*i as f64),
        )),
        (Literal::Float(x), op) => Ok(apply_operator(
            &parse_numeric_cell(cell, literal)?,
            op,
            x,
        )),
    }
}

fn parse_numeric_cell(cell: Option<&str>, literal: &Literal) -> Result<f64, ExecutionError> {
    cell.unwrap_or("")
        .trim()
        .parse::<f64>()
        .map_err(|_| ExecutionError::TypeMismatch {
            cell: cell.map(str::to_string),
            literal: literal.clone(),
        })
}

fn apply_operator<T: PartialOrd + ?Sized>(left: &T, op: ComparisonOp, right: &T) -> bool {
    match op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::NotEq => left != right,
        ComparisonOp::Gt => left > right,
        ComparisonOp::Lt => left < right,
        ComparisonOp::GtEq => left >= right,
        ComparisonOp::LtEq => left <= right,
    }
}

/// `COUNT(*)` counts rows, `COUNT(col)` counts non-null, non-empty cells.
///
/// The argument column is not checked against the table: an unknown column
/// simply counts zero.
fn aggregate_rows(
    table: &Table,
    aggregate: &Aggregate,
    rows: &[usize],
) -> Result<QueryResult, ExecutionError> {
    if !aggregate.function.eq_ignore_ascii_case("COUNT") {
        return Err(ExecutionError::UnsupportedAggregate {
            function: aggregate.function.clone(),
        });
    }

    let count = if aggregate.arg == WILDCARD {
        rows.len()
    } else {
        table
            .get_col(&aggregate.arg)
            .map_or(0, |col| col.count_present(rows))
    };

    Ok(QueryResult {
        columns: vec![aggregate.column_name()],
        rows: vec![vec![Value::Int(i64::try_from(count).unwrap_or(i64::MAX))]],
    })
}

fn project_rows(
    table: &Table,
    query: &ParsedQuery,
    rows: &[usize],
) -> Result<QueryResult, ExecutionError> {
    let select_columns = &query.select_columns;
    if select_columns.is_empty() {
        return Err(ExecutionError::NoColumns);
    }

    if query.is_wildcard() {
        // nothing to infer the columns from
        if rows.is_empty() {
            return Ok(QueryResult::empty());
        }
        return Ok(project(table, table.column_names(), rows));
    }

    // with zero rows the requested columns cannot be validated
    if !rows.is_empty() {
        if let Some(missing) = select_columns.iter().find(|c| !table.has_column(c)) {
            let mut available = table.column_names();
            available.sort();
            return Err(ExecutionError::UnknownSelectColumn {
                column: missing.clone(),
                available,
            });
        }
    }

    Ok(project(table, select_columns.to_vec(), rows))
}

fn project(table: &Table, columns: Vec<String>, rows: &[usize]) -> QueryResult {
    let sources: Vec<_> = columns.iter().map(|name| table.get_col(name)).collect();
    let rows = rows
        .iter()
        .map(|&row| {
            sources
                .iter()
                .map(|col| col.and_then(|c| c.get(row)).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    QueryResult { columns, rows }
}
