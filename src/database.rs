use std::collections::{HashMap, hash_map::Entry};
use std::path::Path;

use tracing::debug;

use crate::ast::ParsedQuery;
use crate::error::{Error, ExecutionError};
use crate::executor::{self, QueryResult};
use crate::loader::{self, LoadOptions};
use crate::parser::parse_sql;
use crate::table::Table;

/// The main entry point for the in-memory query engine.
/// It owns every loaded table by name and orchestrates query execution.
///
/// Tables are never modified once registered; loading a table under a name
/// that is already taken replaces the previous one.
#[derive(Debug, Default)]
pub struct Database {
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self {
            tables: HashMap::default(),
        }
    }

    /// Adds a table under its own name, replacing any table of the same name.
    pub fn register(&mut self, table: Table) -> &Table {
        match self.tables.entry(table.name.clone()) {
            Entry::Occupied(mut slot) => {
                debug!(table = %table.name, "replacing previously loaded table");
                slot.insert(table);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(table),
        }
    }

    /// Loads a comma-separated file and registers it, see [Database::load_csv_with].
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<&Table, ExecutionError> {
        self.load_csv_with(path, &LoadOptions::default())
    }

    /// Loads a delimited file and registers it under the file's stem.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or cannot be read.
    ///
    /// # Example
    /// ```no_run
    /// use csvql::{Database, LoadOptions};
    ///
    /// let mut db = Database::new();
    /// let options = LoadOptions { delimiter: b';', ..LoadOptions::default() };
    /// let table = db.load_csv_with("data/people.csv", &options).unwrap();
    /// assert_eq!(table.name, "people");
    /// ```
    pub fn load_csv_with(
        &mut self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<&Table, ExecutionError> {
        let table = loader::load_table(path, options)?;
        Ok(self.register(table))
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the names of all loaded tables, sorted.
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs an already parsed query, see [executor::evaluate].
    pub fn execute(&self, query: &ParsedQuery) -> Result<QueryResult, ExecutionError> {
        executor::evaluate(query, self)
    }

    /// Parses and runs a `SELECT` query.
    ///
    /// # Example
    ///
    /// ```
    /// use csvql::{Database, Table, Value};
    ///
    /// let mut db = Database::new();
    /// db.register(
    ///     Table::from_rows(
    ///         "products".into(),
    ///         vec!["name".into(), "price".into()],
    ///         vec![
    ///             vec!["Laptop".into(), "1200".into()],
    ///             vec!["Mouse".into(), "25".into()],
    ///         ],
    ///     )
    ///     .unwrap(),
    /// );
    ///
    /// let result = db.query("SELECT name FROM products WHERE price > 100").unwrap();
    ///
    /// assert_eq!(result.columns, vec!["name"]);
    /// assert_eq!(result.rows, vec![vec![Value::from("Laptop")]]);
    /// ```
    ///
    /// # Errors
    /// [Error::Syntax] if the text is not a supported `SELECT`,
    /// [Error::Execution] if it fails against the loaded data.
    pub fn query(&self, sql: &str) -> Result<QueryResult, Error> {
        let query = parse_sql(sql)?;
        Ok(self.execute(&query)?)
    }
}
