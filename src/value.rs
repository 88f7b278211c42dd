use std::fmt;
use std::sync::Arc;

/// Represents a single value stored in a table or produced by a query.
///
/// Loaded tables only ever hold [Value::Null] and [Value::Text]: every cell
/// comes from delimited text and is interpreted lazily at comparison time.
/// [Value::Int] only appears in query results (the output of `COUNT`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// represents an empty or missing value.
    Null,
    /// A 64-bit signed integer value.
    Int(i64),
    /// A UTF-8 string value, wrapped in an [Arc] for efficient,
    /// thread-safe sharing and cheap cloning.
    Text(Arc<str>),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner integer value if this is a [Value::Int].
    /// Otherwise, returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Text].
    /// Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Arc::from(s))
    }
}

/// Renders the value the way the shell prints it: nulls become an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A value written directly in a `WHERE` clause.
///
/// The variant is chosen by the literal's syntax: `3` is an [Literal::Integer]
/// and `3.0` is a [Literal::Float], even though they denote the same number.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A quoted string, contents kept verbatim.
    Text(String),
    /// An unquoted token that parses as a base-10 `i64`.
    Integer(i64),
    /// An unquoted token that parses as an `f64` but not as an `i64`.
    Float(f64),
}

impl Literal {
    /// Interprets the raw text of a `WHERE` value.
    ///
    /// Text wrapped in a matching pair of single or double quotes is a
    /// [Literal::Text] holding everything between the outer quotes, verbatim:
    /// `'O'Brien'` is `O'Brien`. Anything else must be a number, see
    /// [Literal::from_unquoted].
    pub fn parse(raw: &str) -> Option<Self> {
        let quoted = raw.len() >= 2
            && ['\'', '"']
                .iter()
                .any(|&q| raw.starts_with(q) && raw.ends_with(q));
        if quoted {
            return Some(Self::Text(raw[1..raw.len() - 1].to_string()));
        }
        Self::from_unquoted(raw)
    }

    /// Interprets an unquoted token: integer first, then float.
    pub fn from_unquoted(raw: &str) -> Option<Self> {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Self::Integer(i));
        }
        raw.parse::<f64>().ok().map(Self::Float)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(1).is_null());
        assert!(!Value::Text("x".into()).is_null());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Text("42".into()).as_int(), None);
        assert_eq!(Value::Text("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Null.as_str(), None);
        assert_eq!(Value::Int(1).as_str(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::from("Alice").to_string(), "Alice");
    }

    #[test]
    fn test_literal_from_unquoted() {
        assert_eq!(Literal::from_unquoted("3"), Some(Literal::Integer(3)));
        assert_eq!(Literal::from_unquoted("-12"), Some(Literal::Integer(-12)));
        assert_eq!(Literal::from_unquoted("3.0"), Some(Literal::Float(3.0)));
        assert_eq!(Literal::from_unquoted("1e3"), Some(Literal::Float(1000.0)));
        assert_eq!(Literal::from_unquoted("abc"), None);
        assert_eq!(Literal::from_unquoted("1.2.3"), None);
    }

    #[test]
    fn test_literal_parse_quoted() {
        assert_eq!(Literal::parse("'Eng'"), Some(Literal::Text("Eng".into())));
        assert_eq!(Literal::parse("\"USA\""), Some(Literal::Text("USA".into())));
        assert_eq!(Literal::parse("''"), Some(Literal::Text(String::new())));
        // inner quotes are kept as written
        assert_eq!(
            Literal::parse("'O'Brien'"),
            Some(Literal::Text("O'Brien".into()))
        );
        assert_eq!(
            Literal::parse("\"say \"hi\"\""),
            Some(Literal::Text("say \"hi\"".into()))
        );
        assert_eq!(Literal::parse("'3'"), Some(Literal::Text("3".into())));
    }

    #[test]
    fn test_literal_parse_unquoted() {
        assert_eq!(Literal::parse("30"), Some(Literal::Integer(30)));
        assert_eq!(Literal::parse("30.0"), Some(Literal::Float(30.0)));
        assert_eq!(Literal::parse("Eng"), None);
        // unbalanced or mismatched quotes are not strings
        assert_eq!(Literal::parse("'Eng"), None);
        assert_eq!(Literal::parse("'Eng\""), None);
        assert_eq!(Literal::parse("'"), None);
    }

    #[test]
    fn test_literal_variants_stay_distinct() {
        // same number, different syntax
        assert_ne!(Literal::Integer(1), Literal::Float(1.0));
        assert_ne!(Literal::parse("1"), Literal::parse("1.0"));
    }
}
