use std::fmt;

use crate::error::SyntaxError;

/// Lexical units of the structured parts of a query: the `COUNT(...)` call
/// and the column and operator that open a `WHERE` condition.
///
/// Literal values are not tokens; the parser reads them as raw text from
/// [Tokenizer::rest].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Column or function name (`email`, `COUNT`).
    Ident(String),

    // punctuation
    LeftParen,
    RightParen,
    Star,

    // comparison operators: = != > >= < <=
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Lower,
    LowerEqual,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{name}'"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::Star => f.write_str("'*'"),
            Token::Equal => f.write_str("'='"),
            Token::NotEqual => f.write_str("'!='"),
            Token::Greater => f.write_str("'>'"),
            Token::GreaterEqual => f.write_str("'>='"),
            Token::Lower => f.write_str("'<'"),
            Token::LowerEqual => f.write_str("'<='"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// Splits text into [Token]s, one character at a time.
///
/// Tokens can be pulled one by one with [Tokenizer::next_token], leaving the
/// unread text available through [Tokenizer::rest].
pub struct Tokenizer {
    input: Vec<char>,
    /// index into `input`
    position: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens, always
    /// terminated by [Token::Eof].
    ///
    /// # Errors
    /// Returns a [SyntaxError] on the first character that starts no token.
    ///
    /// # Example
    /// ```
    /// # use csvql::tokenizer::{Tokenizer, Token};
    /// let tokens = Tokenizer::new("count(*)").tokenize().unwrap();
    /// assert_eq!(
    ///     tokens,
    ///     vec![
    ///         Token::Ident("count".into()),
    ///         Token::LeftParen,
    ///         Token::Star,
    ///         Token::RightParen,
    ///         Token::Eof,
    ///     ]
    /// );
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Skips whitespace and reads one token; [Token::Eof] once the input is
    /// exhausted.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();
        match ch {
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '*' => self.single(Token::Star),
            '=' => self.single(Token::Equal),
            // two-character operators first, so `>=` never lexes as `>` `=`
            '>' if self.peek_char() == Some('=') => self.double(Token::GreaterEqual),
            '<' if self.peek_char() == Some('=') => self.double(Token::LowerEqual),
            '!' if self.peek_char() == Some('=') => self.double(Token::NotEqual),
            '>' => self.single(Token::Greater),
            '<' => self.single(Token::Lower),
            '!' => Err(SyntaxError::new(
                "Expected '=' after '!'. Comparison operators are =, !=, >, <, >=, <=.",
            )),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_identifier()),
            _ => Err(SyntaxError::new(format!(
                "character {ch:?} is not supported here"
            ))),
        }
    }

    /// The text not consumed yet, untrimmed.
    pub fn rest(&self) -> String {
        self.input[self.position..].iter().collect()
    }

    // cursor

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn single(&mut self, token: Token) -> Result<Token, SyntaxError> {
        self.advance();
        Ok(token)
    }

    fn double(&mut self, token: Token) -> Result<Token, SyntaxError> {
        self.advance();
        self.advance();
        Ok(token)
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, case preserved. There are no reserved words:
    /// `from` in a condition is a column like any other.
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_ascii_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        Token::Ident(ident)
    }
}
