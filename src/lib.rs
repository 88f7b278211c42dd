pub mod ast;
pub mod column;
pub mod database;
pub mod error;
pub mod executor;
pub mod loader;
pub mod parser;
pub mod shell;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use ast::{Aggregate, ComparisonOp, ParsedQuery, WhereClause};
pub use column::Column;
pub use database::Database;
pub use error::{Error, ExecutionError, SyntaxError};
pub use executor::{QueryResult, evaluate};
pub use loader::LoadOptions;
pub use parser::parse_sql;
pub use table::Table;
pub use value::{Literal, Value};
