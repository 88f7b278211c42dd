//! Line-oriented query shell and result rendering.

use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::database::Database;
use crate::error::Error;
use crate::executor::QueryResult;

pub const PROMPT: &str = "sql> ";

/// `exit`, `quit` or `\q`, in any case.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.to_lowercase();
    matches!(line.as_str(), "exit" | "quit" | "\\q")
}

/// Renders a result as an aligned text table:
///
/// ```text
/// name  | dept
/// ----- | ----
/// Alice | Eng
/// ```
///
/// Each column is left-justified to its widest cell or header; nulls print
/// as empty strings.
pub fn render_table(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "(no columns)\n".to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            (0..result.columns.len())
                .map(|i| row.get(i).map(ToString::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(column.chars().count(), usize::max)
        })
        .collect();

    let format_row = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect();
        padded.join(" | ")
    };

    let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = String::new();
    out.push_str(&format_row(&result.columns));
    out.push('\n');
    out.push_str(&format_row(&separator));
    out.push('\n');
    for row in &cells {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// Reads queries line by line from `input` and writes results to `output`.
pub struct Shell<'a, R, W> {
    db: &'a Database,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(db: &'a Database, input: R, output: W) -> Self {
        Self { db, input, output }
    }

    /// Prints the startup lines naming the loaded table.
    pub fn banner(&mut self, table: &str, source: &str) -> io::Result<()> {
        writeln!(self.output, "Loaded table '{table}' from '{source}'")?;
        writeln!(
            self.output,
            "Enter SQL queries, or type 'exit', 'quit', or '\\q' to quit."
        )?;
        writeln!(self.output, "Remember: use FROM {table}")?;
        writeln!(self.output)
    }

    /// Runs until an exit command or end of input.
    ///
    /// Query errors are printed and the loop goes on; only failures to read
    /// input or write output end it early.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    writeln!(self.output)?;
                    break;
                }
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    writeln!(self.output, "[Unexpected error] {err}")?;
                    writeln!(self.output)?;
                    continue;
                }
                Err(err) => return Err(err),
            }

            let stripped = line.trim();
            if is_exit_command(stripped) {
                break;
            }
            if stripped.is_empty() {
                continue;
            }

            self.run_query(stripped)?;
            writeln!(self.output)?; // blank line after each result
        }

        writeln!(self.output, "Goodbye!")?;
        self.output.flush()
    }

    fn run_query(&mut self, sql: &str) -> io::Result<()> {
        let db = self.db;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| db.query(sql)));

        match outcome {
            Ok(Ok(result)) => {
                debug!(rows = result.rows.len(), "query succeeded");
                write!(self.output, "{}", render_table(&result))
            }
            Ok(Err(Error::Syntax(err))) => writeln!(self.output, "[Syntax error] {err}"),
            Ok(Err(Error::Execution(err))) => writeln!(self.output, "[Execution error] {err}"),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "query panicked".to_string());
                writeln!(self.output, "[Unexpected error] {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use crate::value::Value;

    fn people_db() -> Database {
        let mut db = Database::new();
        db.register(
            Table::from_rows(
                "people".into(),
                vec!["name".into(), "dept".into()],
                vec![
                    vec!["Alice".into(), "Eng".into()],
                    vec!["Bob".into(), Value::Null],
                ],
            )
            .unwrap(),
        );
        db
    }

    fn session(db: &Database, input: &str) -> String {
        let mut output = Vec::new();
        Shell::new(db, input.as_bytes(), &mut output).run().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_exit_commands() {
        for cmd in ["exit", "EXIT", "Quit", "\\q", "\\Q"] {
            assert!(is_exit_command(cmd), "{cmd}");
        }
        assert!(!is_exit_command("exit;"));
        assert!(!is_exit_command("q"));
    }

    #[test]
    fn test_render_table_alignment() {
        let result = QueryResult {
            columns: vec!["name".into(), "dept".into()],
            rows: vec![
                vec![Value::from("Alice"), Value::from("Eng")],
                vec![Value::from("Bob"), Value::Null],
            ],
        };
        assert_eq!(
            render_table(&result),
            "name  | dept\n\
             ----- | ----\n\
             Alice | Eng \n\
             Bob   |     \n"
        );
    }

    #[test]
    fn test_render_counts_and_no_columns() {
        let result = QueryResult {
            columns: vec!["COUNT(*)".into()],
            rows: vec![vec![Value::Int(2)]],
        };
        assert_eq!(render_table(&result), "COUNT(*)\n--------\n2       \n");
        assert_eq!(render_table(&QueryResult::empty()), "(no columns)\n");
    }

    #[test]
    fn test_render_width_counts_chars() {
        let result = QueryResult {
            columns: vec!["c".into()],
            rows: vec![vec![Value::from("é")]],
        };
        assert_eq!(render_table(&result), "c\n-\né\n");
    }

    #[test]
    fn test_session_runs_queries_until_exit() {
        let db = people_db();
        let output = session(
            &db,
            "SELECT name FROM people WHERE dept = 'Eng';\n\n   \nquit\nSELECT * FROM people\n",
        );
        assert_eq!(
            output,
            "sql> name \n-----\nAlice\n\nsql> sql> sql> Goodbye!\n"
        );
    }

    #[test]
    fn test_session_reports_errors_and_continues() {
        let db = people_db();
        let output = session(
            &db,
            "SELECT FROM people\nSELECT age FROM people\nSELECT COUNT(*) FROM people\n",
        );
        assert!(output.contains("[Syntax error] "));
        assert!(output.contains(
            "[Execution error] Column 'age' in SELECT does not exist. Available columns: dept, name."
        ));
        assert!(output.contains("COUNT(*)\n--------\n2       \n"));
        // end of input
        assert!(output.ends_with("sql> \nGoodbye!\n"));
    }

    #[test]
    fn test_session_handles_invalid_utf8() {
        let db = people_db();
        let mut output = Vec::new();
        let input: &[u8] = b"\xff\xfe\nexit\n";
        Shell::new(&db, input, &mut output).run().unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("[Unexpected error]"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_banner() {
        let db = people_db();
        let mut output = Vec::new();
        Shell::new(&db, &b""[..], &mut output)
            .banner("people", "data/people.csv")
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Loaded table 'people' from 'data/people.csv'\n"));
        assert!(output.contains("Remember: use FROM people\n"));
    }
}
