//! Lexer (tokenizer) for SPICE-style netlists.

use crate::error::{Result, SymmetryError};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in a netlist.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Instance, net or model name
    Identifier,
    /// A number, possibly with a scale suffix
    Number,
    /// A dot command (`.subckt`, `.ends`, ...)
    Directive,
    /// Equals sign '='
    Equals,
    /// '+' at the start of a line: continues the previous statement
    Continuation,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let ch = match self.chars.peek() {
            Some(&(_, ch)) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line: self.line,
                    column: self.column,
                });
            }
        };

        let start_line = self.line;
        let start_column = self.column;
        let line_start = self.at_line_start;
        self.at_line_start = false;

        let (kind, text) = match ch {
            '\n' => {
                self.advance();
                self.at_line_start = true;
                (TokenKind::Newline, "\n".to_string())
            }
            '=' => {
                self.advance();
                (TokenKind::Equals, "=".to_string())
            }
            '+' if line_start => {
                self.advance();
                (TokenKind::Continuation, "+".to_string())
            }
            '.' if line_start => {
                let text = self.read_word();
                (TokenKind::Directive, text)
            }
            _ if is_word_char(ch) => {
                let text = self.read_word();
                if looks_like_number(&text) {
                    (TokenKind::Number, text)
                } else {
                    (TokenKind::Identifier, text)
                }
            }
            _ => {
                return Err(SymmetryError::lexer(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(Token {
            kind,
            text,
            line: start_line,
            column: start_column,
        })
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn rest(&mut self) -> &'a str {
        let pos = self
            .chars
            .peek()
            .map(|&(pos, _)| pos)
            .unwrap_or(self.input.len());
        &self.input[pos..]
    }

    fn skip_to_end_of_line(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' | '(' | ')' => {
                    self.advance();
                }
                // Trailing comments
                '$' | ';' => self.skip_to_end_of_line(),
                '*' if self.at_line_start => self.skip_to_end_of_line(),
                '/' if self.rest().starts_with("//") => self.skip_to_end_of_line(),
                _ => break,
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if !is_word_char(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
        || matches!(ch, '_' | '-' | '+' | '<' | '>' | '[' | ']' | '!' | ':' | '/' | '.')
}

fn looks_like_number(text: &str) -> bool {
    let first = match text.chars().next() {
        Some(c) => c,
        None => return false,
    };
    (first.is_ascii_digit() || first == '.' || first == '-' || first == '+')
        && parse_value(text).is_some()
}

/// Parse a SPICE number with an optional scale suffix.
///
/// Suffixes are case-insensitive (`f p n u m k meg g t`); letters after the
/// scale factor are units and are ignored, so `10uF` is `1e-5`.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|&(i, c)| c.is_ascii_alphabetic() && !is_exponent_marker(text, i))
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let (num_str, suffix) = text.split_at(split);
    if num_str.is_empty() {
        return None;
    }
    let (mantissa, exponent) = match num_str.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&num_str[..i], num_str[i + 1..].parse::<i32>().ok()?),
        None => (num_str, 0),
    };

    let suffix = suffix.to_lowercase();
    if !suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let scale = if suffix.starts_with("meg") {
        6
    } else {
        match suffix.chars().next() {
            Some('f') => -15,
            Some('p') => -12,
            Some('n') => -9,
            Some('u') => -6,
            Some('m') => -3,
            Some('k') => 3,
            Some('g') => 9,
            Some('t') => 12,
            _ => 0,
        }
    };

    // Scaling by a decimal exponent keeps the result correctly rounded,
    // so `0.5u` and `500n` give the same f64.
    let exponent = exponent.checked_add(scale)?;
    format!("{mantissa}e{exponent}").parse().ok()
}

/// An `e`/`E` at `i` is an exponent marker when digits (optionally signed) follow.
fn is_exponent_marker(text: &str, i: usize) -> bool {
    let bytes = text.as_bytes();
    if !matches!(bytes[i], b'e' | b'E') || i == 0 {
        return false;
    }
    if !(bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.') {
        return false;
    }
    let mut j = i + 1;
    if j < bytes.len() && matches!(bytes[j], b'-' | b'+') {
        j += 1;
    }
    j < bytes.len() && bytes[j].is_ascii_digit()
}
