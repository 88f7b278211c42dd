use std::fmt;

use crate::value::Literal;

/// The wildcard marker: "all columns" in a select list, "all rows" in `COUNT(*)`.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `WHERE <column> <op> <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Literal,
}

/// An aggregate call in the select list, e.g. `COUNT(*)` or `COUNT(email)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Upper-cased function name. The parser only produces `COUNT`.
    pub function: String,
    /// [WILDCARD] or a column name.
    pub arg: String,
}

impl Aggregate {
    pub fn count(arg: impl Into<String>) -> Self {
        Self {
            function: "COUNT".to_string(),
            arg: arg.into(),
        }
    }

    /// Name of the single output column, e.g. `COUNT(*)`.
    pub fn column_name(&self) -> String {
        format!("{}({})", self.function.to_ascii_uppercase(), self.arg)
    }
}

/// A successfully parsed `SELECT` query.
///
/// Exactly one of `select_columns` (non-empty) and `aggregate` is set.
/// A wildcard select is `select_columns == ["*"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub table: String,
    pub select_columns: Vec<String>,
    pub aggregate: Option<Aggregate>,
    pub where_clause: Option<WhereClause>,
}

impl ParsedQuery {
    /// `SELECT *`, as opposed to a column list or an aggregate.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.select_columns.as_slice(), [only] if only == WILDCARD)
    }
}
