use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvql::shell::Shell;
use csvql::{Database, LoadOptions};

#[derive(Parser)]
#[command(
    name = "csvql",
    version,
    about = "Query a CSV file with a small subset of SQL",
    after_help = r#"EXAMPLES
  $ csvql data/people.csv
  sql> SELECT name, email FROM people WHERE department = 'Engineering';
  sql> SELECT COUNT(*) FROM people WHERE age >= 30;

Set RUST_LOG (e.g. RUST_LOG=csvql=debug) to see load and query diagnostics on stderr."#
)]
struct Cli {
    #[arg(help = "Delimited text file to load; the table is named after the file stem")]
    path: PathBuf,
    #[arg(
        long,
        default_value_t = ',',
        value_parser = parse_delimiter,
        help = "Field delimiter (a single ASCII character)"
    )]
    delimiter: char,
    #[arg(long, help = "Trim whitespace around headers and fields")]
    trim: bool,
}

fn parse_delimiter(raw: &str) -> Result<char, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("expected a single ASCII character, got {raw:?}")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let options = LoadOptions {
        delimiter: cli.delimiter as u8,
        trim: cli.trim,
    };

    let mut db = Database::new();
    let table_name = match db.load_csv_with(&cli.path, &options) {
        Ok(table) => table.name.clone(),
        Err(err) => {
            eprintln!("Error loading CSV: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(table = %table_name, path = %cli.path.display(), "table loaded");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(&db, stdin.lock(), stdout.lock());
    let outcome = shell
        .banner(&table_name, &cli.path.display().to_string())
        .and_then(|()| shell.run());

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
