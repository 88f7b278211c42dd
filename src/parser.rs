use tracing::trace;

use crate::ast::*;
use crate::error::SyntaxError;
use crate::tokenizer::{Token, Tokenizer};
use crate::value::Literal;

const QUERY_FORM: &str =
    "Expected: SELECT <columns | * | COUNT(...)> FROM <table> [WHERE <column> <op> <value>];";
const WHERE_FORM: &str =
    "Expected: column OP value with OP in (=, !=, >, <, >=, <=).";

/// Parses a single `SELECT` statement.
///
/// The statement is first cut into its clauses on the `SELECT`, `FROM` and
/// `WHERE` keywords, each of which must stand between whitespace. The select
/// list is the shortest text that leaves a valid `FROM <table> [WHERE ...]`
/// tail, so column names may contain spaces, dashes or any other character
/// except a comma.
///
/// # Example
/// ```
/// # use csvql::parser::parse_sql;
/// let query = parse_sql("select first name, e-mail from people where age >= 30;").unwrap();
/// assert_eq!(query.table, "people");
/// assert_eq!(query.select_columns, vec!["first name", "e-mail"]);
/// ```
pub fn parse_sql(sql: &str) -> Result<ParsedQuery, SyntaxError> {
    let clauses = Clauses::split(sql)?;
    let (select_columns, aggregate) = parse_select_spec(clauses.select)?;
    let where_clause = clauses.filter.map(parse_where).transpose()?;

    let query = ParsedQuery {
        table: clauses.table.to_string(),
        select_columns,
        aggregate,
        where_clause,
    };
    trace!(?query, "parsed query");
    Ok(query)
}

/// `SELECT <select> FROM <table> [WHERE <filter>]`, each part trimmed.
#[derive(Debug, PartialEq)]
struct Clauses<'a> {
    select: &'a str,
    table: &'a str,
    filter: Option<&'a str>,
}

impl<'a> Clauses<'a> {
    fn split(sql: &'a str) -> Result<Self, SyntaxError> {
        let body = sql.trim();
        if body.is_empty() {
            return Err(SyntaxError::new(format!("Empty query. {QUERY_FORM}")));
        }
        // semicolon is optional so drop it
        let body = body.strip_suffix(';').map_or(body, str::trim_end);

        let rest = strip_keyword(body, "SELECT").ok_or_else(|| {
            SyntaxError::new(format!(
                "Query must start with SELECT and a select list. {QUERY_FORM}"
            ))
        })?;

        // try each `FROM` in turn, keeping the first error to report
        let mut first_err = None;
        for (select_end, after_from) in from_keywords(rest) {
            match table_and_filter(after_from) {
                Ok((table, filter)) => {
                    return Ok(Self {
                        select: rest[..select_end].trim(),
                        table,
                        filter,
                    });
                }
                Err(err) if first_err.is_none() => first_err = Some(err),
                Err(_) => {}
            }
        }

        Err(first_err.unwrap_or_else(|| {
            SyntaxError::new(format!(
                "Missing select list or FROM clause: expected '*', COUNT(...) or column names between SELECT and FROM. {QUERY_FORM}"
            ))
        }))
    }
}

/// Strips a leading case-insensitive `keyword` that is followed by whitespace,
/// returning the text after that whitespace.
fn strip_keyword<'s>(text: &'s str, keyword: &str) -> Option<&'s str> {
    let head = text.get(..keyword.len())?;
    let tail = &text[keyword.len()..];
    (head.eq_ignore_ascii_case(keyword) && tail.starts_with(char::is_whitespace))
        .then(|| tail.trim_start())
}

/// Every whitespace-delimited `FROM` in `text` after at least one character
/// of select list, as (end of the select list, text after `FROM`).
fn from_keywords(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.char_indices()
        .filter(move |&(i, c)| {
            c.is_whitespace() && i > 0 && !text[..i].ends_with(char::is_whitespace)
        })
        .filter_map(move |(i, _)| {
            strip_keyword(text[i..].trim_start(), "FROM").map(|after| (i, after))
        })
}

/// `<table>` or `<table> WHERE <filter>`.
fn table_and_filter(text: &str) -> Result<(&str, Option<&str>), SyntaxError> {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    let table = &text[..end];
    if table.is_empty() || table.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(SyntaxError::new(format!(
            "Expected a table name after FROM. {QUERY_FORM}"
        )));
    }

    let tail = &text[end..];
    if tail.is_empty() {
        return Ok((table, None));
    }
    let trailing = tail.trim_start();
    if tail.starts_with(char::is_whitespace) {
        if let Some(filter) = strip_keyword(trailing, "WHERE") {
            return Ok((table, Some(filter)));
        }
        if trailing.eq_ignore_ascii_case("WHERE") {
            return Err(SyntaxError::new(format!(
                "Missing condition after WHERE. {WHERE_FORM}"
            )));
        }
    }
    Err(SyntaxError::new(format!(
        "Unexpected '{trailing}' after table '{table}'. {QUERY_FORM}"
    )))
}

/// `*` | `COUNT(*)` | `COUNT(col)` | `col1, col2, ...`
///
/// Anything shaped like a `COUNT(` call must be a whole, valid aggregate; it
/// is never read as a column name.
fn parse_select_spec(select: &str) -> Result<(Vec<String>, Option<Aggregate>), SyntaxError> {
    if looks_like_count(select) {
        return Ok((Vec::new(), Some(parse_aggregate(select)?)));
    }
    if select == WILDCARD {
        return Ok((vec![WILDCARD.to_string()], None));
    }
    Ok((parse_column_list(select)?, None))
}

fn looks_like_count(select: &str) -> bool {
    select
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("COUNT"))
        && select[5..].trim_start().starts_with('(')
}

fn parse_aggregate(select: &str) -> Result<Aggregate, SyntaxError> {
    let invalid = || {
        SyntaxError::new(format!(
            "Invalid aggregate '{select}': expected COUNT(*) or COUNT(column) as the whole select list."
        ))
    };
    let tokens = Tokenizer::new(select).tokenize().map_err(|_| invalid())?;

    match tokens.as_slice() {
        [Token::Ident(_), Token::LeftParen, Token::Star, Token::RightParen, Token::Eof] => {
            Ok(Aggregate::count(WILDCARD))
        }
        [Token::Ident(_), Token::LeftParen, Token::Ident(arg), Token::RightParen, Token::Eof] => {
            Ok(Aggregate::count(arg.as_str()))
        }
        _ => Err(invalid()),
    }
}

/// Comma-separated names, each trimmed and taken as written.
fn parse_column_list(select: &str) -> Result<Vec<String>, SyntaxError> {
    let columns: Vec<String> = select.split(',').map(|c| c.trim().to_string()).collect();
    if columns.iter().any(String::is_empty) {
        return Err(SyntaxError::new(format!(
            "Invalid column list in SELECT clause: '{select}' has an empty entry. {QUERY_FORM}"
        )));
    }
    Ok(columns)
}

/// `<column> <op> <value>`, where the value is the rest of the condition.
fn parse_where(filter: &str) -> Result<WhereClause, SyntaxError> {
    let mut lexer = Tokenizer::new(filter);

    let column = match lexer.next_token() {
        Ok(Token::Ident(name)) => name,
        _ => return Err(where_error()),
    };

    let op = match lexer.next_token().map_err(|_| where_error())? {
        Token::Equal => ComparisonOp::Eq,
        Token::NotEqual => ComparisonOp::NotEq,
        Token::Greater => ComparisonOp::Gt,
        Token::Lower => ComparisonOp::Lt,
        Token::GreaterEqual => ComparisonOp::GtEq,
        Token::LowerEqual => ComparisonOp::LtEq,
        other => {
            return Err(SyntaxError::new(format!(
                "Expected a comparison operator after '{column}', found {other}. {WHERE_FORM}"
            )));
        }
    };

    let rest = lexer.rest();
    let raw = rest.trim();
    if raw.is_empty() {
        return Err(SyntaxError::new(format!(
            "Missing value in WHERE clause. {WHERE_FORM}"
        )));
    }
    let value = Literal::parse(raw).ok_or_else(|| invalid_literal(raw))?;

    Ok(WhereClause { column, op, value })
}

fn where_error() -> SyntaxError {
    SyntaxError::new(format!("Could not parse WHERE clause. {WHERE_FORM}"))
}

fn invalid_literal(raw: &str) -> SyntaxError {
    SyntaxError::new(format!(
        "Invalid literal value in WHERE clause: '{raw}'. Strings must be quoted; numbers unquoted."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> ParsedQuery {
        parse_sql(sql).unwrap()
    }

    #[test]
    fn test_parse_select_star() {
        let query = parse("SELECT * FROM people;");
        assert_eq!(query.table, "people");
        assert_eq!(query.select_columns, vec!["*"]);
        assert!(query.is_wildcard());
        assert_eq!(query.aggregate, None);
        assert_eq!(query.where_clause, None);
    }

    #[test]
    fn test_parse_column_list() {
        let query = parse("SELECT name,  age ,email FROM people");
        assert_eq!(query.select_columns, vec!["name", "age", "email"]);
        assert!(!query.is_wildcard());
    }

    #[test]
    fn test_parse_is_case_insensitive_for_keywords_only() {
        let query = parse("  select Name fRoM People wHeRe Dept = 'Eng'  ");
        assert_eq!(query.table, "People");
        assert_eq!(query.select_columns, vec!["Name"]);
        let where_clause = query.where_clause.unwrap();
        assert_eq!(where_clause.column, "Dept");
        assert_eq!(where_clause.value, Literal::Text("Eng".into()));
    }

    #[test]
    fn test_parse_count_star() {
        let query = parse("SELECT COUNT(*) FROM people;");
        assert!(query.select_columns.is_empty());
        assert_eq!(query.aggregate, Some(Aggregate::count("*")));
    }

    #[test]
    fn test_parse_count_column() {
        let query = parse("select count ( email ) from people where country = \"USA\"");
        let aggregate = query.aggregate.unwrap();
        assert_eq!(aggregate.function, "COUNT");
        assert_eq!(aggregate.arg, "email");
        assert_eq!(aggregate.column_name(), "COUNT(email)");
        assert_eq!(
            query.where_clause.unwrap().value,
            Literal::Text("USA".into())
        );
    }

    #[test]
    fn test_column_named_count_is_not_an_aggregate() {
        let query = parse("SELECT count FROM stats");
        assert_eq!(query.select_columns, vec!["count"]);
        assert_eq!(query.aggregate, None);
    }

    #[test]
    fn test_aggregate_must_be_alone() {
        let err = parse_sql("SELECT COUNT(*), name FROM people").unwrap_err();
        assert!(err.message().contains("Invalid aggregate"));
    }

    #[test]
    fn test_other_calls_are_column_names() {
        // only a leading COUNT( is an aggregate; the rest is a header lookup
        assert_eq!(parse("SELECT SUM(age) FROM people").select_columns, vec!["SUM(age)"]);
        assert_eq!(
            parse("SELECT name, COUNT(*) FROM people").select_columns,
            vec!["name", "COUNT(*)"]
        );
    }

    #[test]
    fn test_bad_count_argument() {
        assert!(parse_sql("SELECT COUNT() FROM people").is_err());
        assert!(parse_sql("SELECT COUNT(1) FROM people").is_err());
        assert!(parse_sql("SELECT COUNT(a, b) FROM people").is_err());
    }

    #[test]
    fn test_parse_where_operators() {
        let cases = [
            ("=", ComparisonOp::Eq),
            ("!=", ComparisonOp::NotEq),
            (">", ComparisonOp::Gt),
            ("<", ComparisonOp::Lt),
            (">=", ComparisonOp::GtEq),
            ("<=", ComparisonOp::LtEq),
        ];
        for (text, op) in cases {
            let query = parse(&format!("SELECT name FROM people WHERE age {text} 30"));
            let where_clause = query.where_clause.unwrap();
            assert_eq!(where_clause.op, op, "operator {text}");
            assert_eq!(where_clause.value, Literal::Integer(30));
        }
    }

    #[test]
    fn test_where_without_spaces() {
        let where_clause = parse("SELECT * FROM t WHERE score>=2.5;").where_clause.unwrap();
        assert_eq!(where_clause.column, "score");
        assert_eq!(where_clause.op, ComparisonOp::GtEq);
        assert_eq!(where_clause.value, Literal::Float(2.5));
    }

    #[test]
    fn test_integer_and_float_literals_stay_distinct() {
        let int = parse("SELECT * FROM t WHERE x = 3").where_clause.unwrap();
        let float = parse("SELECT * FROM t WHERE x = 3.0").where_clause.unwrap();
        assert_eq!(int.value, Literal::Integer(3));
        assert_eq!(float.value, Literal::Float(3.0));
    }

    #[test]
    fn test_negative_literal() {
        let where_clause = parse("SELECT * FROM t WHERE x > -10").where_clause.unwrap();
        assert_eq!(where_clause.value, Literal::Integer(-10));
    }

    #[test]
    fn test_bare_word_floats() {
        let where_clause = parse("SELECT * FROM t WHERE x < inf").where_clause.unwrap();
        assert_eq!(where_clause.value, Literal::Float(f64::INFINITY));
    }

    #[test]
    fn test_unquoted_text_literal_is_rejected() {
        let err = parse_sql("SELECT * FROM people WHERE dept = Eng").unwrap_err();
        assert!(err.message().contains("Strings must be quoted"));
    }

    #[test]
    fn test_string_literal_keeps_spaces_and_case() {
        let where_clause = parse("SELECT * FROM t WHERE city = '  New York '")
            .where_clause
            .unwrap();
        assert_eq!(where_clause.value, Literal::Text("  New York ".into()));
    }

    #[test]
    fn test_missing_select_list() {
        assert!(parse_sql("SELECT FROM people;").is_err());
    }

    #[test]
    fn test_missing_from() {
        assert!(parse_sql("SELECT name people").is_err());
        assert!(parse_sql("SELECT name").is_err());
    }

    #[test]
    fn test_empty_column_entries() {
        assert!(parse_sql("SELECT name, FROM people").is_err());
        assert!(parse_sql("SELECT name,,age FROM people").is_err());
        assert!(parse_sql("SELECT ,name FROM people").is_err());
    }

    #[test]
    fn test_star_mixed_with_columns() {
        let query = parse("SELECT *, name FROM people");
        assert_eq!(query.select_columns, vec!["*", "name"]);
        assert!(!query.is_wildcard());
    }

    #[test]
    fn test_headers_with_spaces_and_dashes() {
        let query = parse("SELECT first name,  e-mail , Zip Code FROM people WHERE id = 1");
        assert_eq!(query.select_columns, vec!["first name", "e-mail", "Zip Code"]);
        assert_eq!(query.table, "people");
        assert_eq!(query.where_clause.unwrap().column, "id");
    }

    #[test]
    fn test_select_list_ends_at_first_valid_from() {
        let query = parse("SELECT from date, to date FROM trips");
        assert_eq!(query.select_columns, vec!["from date", "to date"]);
        assert_eq!(query.table, "trips");
    }

    #[test]
    fn test_keywords_need_surrounding_whitespace() {
        assert!(parse_sql("SELECT*FROM people").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE(age > 3)").is_err());
        assert!(parse_sql("SELECT COUNT(*)FROM people").is_err());
        assert!(parse_sql("SELECT name FROMpeople").is_err());
    }

    #[test]
    fn test_keyword_as_where_column() {
        let where_clause = parse("SELECT * FROM flights WHERE from = 'LYS'")
            .where_clause
            .unwrap();
        assert_eq!(where_clause.column, "from");
        assert_eq!(where_clause.value, Literal::Text("LYS".into()));
    }

    #[test]
    fn test_quoted_literal_spans_to_last_quote() {
        let where_clause = parse("SELECT * FROM people WHERE name = 'O'Brien';")
            .where_clause
            .unwrap();
        assert_eq!(where_clause.value, Literal::Text("O'Brien".into()));

        let where_clause = parse("SELECT * FROM t WHERE quote = \"say \"hi\"\"")
            .where_clause
            .unwrap();
        assert_eq!(where_clause.value, Literal::Text("say \"hi\"".into()));
    }

    #[test]
    fn test_space_before_semicolon() {
        assert_eq!(parse("SELECT * FROM people ;").table, "people");
    }

    #[test]
    fn test_malformed_where() {
        assert!(parse_sql("SELECT * FROM people WHERE").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE age").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE age >").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE age = = 3").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE age = 3 = 4").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE 3 = age").is_err());
        assert!(parse_sql("SELECT * FROM people WHERE name = 'unterminated").is_err());
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(parse_sql("SELECT * FROM people LIMIT 5").is_err());
        assert!(parse_sql("SELECT * FROM people;;").is_err());
        assert!(parse_sql("SELECT * FROM 1people").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_sql("").is_err());
        assert!(parse_sql("   ").is_err());
        assert!(parse_sql(";").is_err());
    }

    #[test]
    fn test_not_a_select() {
        let err = parse_sql("DELETE FROM people").unwrap_err();
        assert!(err.message().contains("SELECT"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let sql = "SELECT COUNT(email) FROM people WHERE age >= 21.5;";
        assert_eq!(parse_sql(sql), parse_sql(sql));
    }
}
