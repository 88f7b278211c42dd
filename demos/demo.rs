use csvql::shell::render_table;
use csvql::{Database, Error, Table, Value};

fn main() -> Result<(), Error> {
    println!("CSV Query Demo\n");

    // Create DB
    let mut db = Database::new();

    // Build table "users" the way the loader would: every cell is text
    let users = Table::from_rows(
        "users".into(),
        vec!["id".into(), "name".into(), "age".into(), "email".into()],
        vec![
            vec!["1".into(), "Alice".into(), "30".into(), "alice@example.com".into()],
            vec!["2".into(), "Bob".into(), "".into(), Value::Null], // Bob's age is unknown
            vec!["3".into(), "Charlie".into(), "25".into(), "charlie@example.com".into()],
        ],
    )?;
    db.register(users);
    println!("Registered table 'users'\n");

    // Load the sample file shipped next to this demo, if present
    let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/people.csv");
    match db.load_csv(sample) {
        Ok(table) => println!("Loaded '{}' with {} rows\n", table.name, table.row_count),
        Err(err) => println!("Skipping sample file: {err}\n"),
    }

    for sql in [
        "SELECT name, email FROM users WHERE age > 26",
        "SELECT COUNT(email) FROM users",
        "SELECT * FROM people WHERE department = 'Engineering';",
        "SELECT name FROM users WHERE name >= 'B'",
    ] {
        println!("sql> {sql}");
        match db.query(sql) {
            Ok(result) => print!("{}", render_table(&result)),
            Err(err) => println!("error: {err}"),
        }
        println!();
    }

    // List tables
    println!("Tables in database:");
    for table_name in db.list_tables() {
        println!("  - {}", table_name);
    }

    Ok(())
}
