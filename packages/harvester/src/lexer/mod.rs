//! Tolerant line-based tokenizer for the scanned Python sources.
//!
//! The tokenizer only needs to be good enough for locating classes,
//! methods and call sites. Characters no recognizer accepts are skipped and
//! counted, so drift in the source language shows up as a rising
//! `skipped_chars` figure rather than as lost data.

mod token;

pub use token::{Token, TokenKind};
pub(crate) use token::unescape;

/// Single-character operators the tokenizer recognizes.
pub const OPERATORS: &[char] = &[
    '(', ')', '[', ']', '{', '}', ',', ':', '.', '=', '+', '-', '*', '/', '%', '<', '>', '@', '!',
    '&', '|', '^', '~',
];

/// Output of a tokenizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,

    /// Characters no recognizer accepted.
    pub skipped_chars: usize,
}

/// Tokenize source text.
///
/// # Examples
/// ```
/// use holiday_harvester::lexer::{tokenize, TokenKind};
///
/// let stream = tokenize("class Spain(HolidayBase):\n");
/// assert_eq!(stream.tokens[1].kind, TokenKind::ClassKeyword);
/// assert_eq!(stream.tokens[2].text, "Spain");
/// ```
pub fn tokenize(text: &str) -> TokenStream {
    let mut tokenizer = Tokenizer::default();
    for (index, line) in text.lines().enumerate() {
        tokenizer.line(index + 1, line);
    }
    tokenizer.finish()
}

/// A triple-quoted string that has not been closed yet.
#[derive(Debug)]
struct OpenString {
    delimiter: &'static str,
    text: String,
    line: usize,
    column: usize,
}

#[derive(Debug, Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    skipped_chars: usize,
    open: Option<OpenString>,
}

impl Tokenizer {
    fn line(&mut self, line_number: usize, line: &str) {
        let chars: Vec<char> = line.chars().collect();

        if let Some(mut open) = self.open.take() {
            match find_delimiter(&chars, 0, open.delimiter) {
                Some(end) => {
                    open.text.push('\n');
                    open.text.extend(&chars[..end + 3]);
                    self.tokens.push(Token::new(
                        TokenKind::StringLiteral,
                        open.text,
                        open.line,
                        open.column,
                    ));
                    self.scan(line_number, &chars, end + 3);
                }
                None => {
                    open.text.push('\n');
                    open.text.extend(&chars);
                    self.open = Some(open);
                }
            }
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let indent = chars.iter().take_while(|c| **c == ' ').count();
        self.tokens.push(Token::new(
            TokenKind::Indent,
            " ".repeat(indent),
            line_number,
            1,
        ));
        self.scan(line_number, &chars, indent);
    }

    /// Scan `chars[start..]`, trying the recognizers in order.
    fn scan(&mut self, line_number: usize, chars: &[char], start: usize) {
        let mut pos = start;

        while pos < chars.len() {
            let c = chars[pos];
            let column = pos + 1;

            // Whitespace between tokens.
            if c.is_whitespace() {
                pos += 1;
                continue;
            }

            // Inline comment runs to end of line.
            if c == '#' {
                break;
            }

            // Triple-quoted strings, possibly with a prefix such as `r` or `f`.
            let prefix_len = string_prefix_len(chars, pos);
            if let Some(delimiter) = triple_delimiter(chars, pos + prefix_len) {
                let body_start = pos + prefix_len + 3;
                match find_delimiter(chars, body_start, delimiter) {
                    Some(end) => {
                        let text: String = chars[pos..end + 3].iter().collect();
                        self.tokens.push(Token::new(
                            TokenKind::StringLiteral,
                            text,
                            line_number,
                            column,
                        ));
                        pos = end + 3;
                        continue;
                    }
                    None => {
                        self.open = Some(OpenString {
                            delimiter,
                            text: chars[pos..].iter().collect(),
                            line: line_number,
                            column,
                        });
                        return;
                    }
                }
            }

            // Single-line strings, escapes honored.
            if prefix_len > 0 || c == '"' || c == '\'' {
                let quote = chars[pos + prefix_len];
                let end = scan_string(chars, pos + prefix_len + 1, quote);
                let text: String = chars[pos..end].iter().collect();
                self.tokens.push(Token::new(
                    TokenKind::StringLiteral,
                    text,
                    line_number,
                    column,
                ));
                pos = end;
                continue;
            }

            // Keywords first, then plain identifiers.
            if c.is_alphabetic() || c == '_' {
                let end = scan_while(chars, pos, |c| c.is_alphanumeric() || c == '_');
                let text: String = chars[pos..end].iter().collect();
                let kind = match text.as_str() {
                    "class" => TokenKind::ClassKeyword,
                    "def" => TokenKind::DefKeyword,
                    "self" => TokenKind::SelfRef,
                    _ => TokenKind::Identifier,
                };
                self.tokens.push(Token::new(kind, text, line_number, column));
                pos = end;
                continue;
            }

            if c.is_ascii_digit() {
                let end = scan_while(chars, pos, |c| c.is_ascii_digit() || c == '_');
                let text: String = chars[pos..end].iter().collect();
                self.tokens.push(Token::new(
                    TokenKind::NumberLiteral,
                    text,
                    line_number,
                    column,
                ));
                pos = end;
                continue;
            }

            if OPERATORS.contains(&c) {
                self.tokens.push(Token::new(
                    TokenKind::Operator,
                    c.to_string(),
                    line_number,
                    column,
                ));
                pos += 1;
                continue;
            }

            self.skipped_chars += 1;
            pos += 1;
        }
    }

    fn finish(mut self) -> TokenStream {
        if let Some(open) = self.open.take() {
            tracing::debug!(line = open.line, "unterminated triple-quoted string at end of input");
            self.tokens.push(Token::new(
                TokenKind::StringLiteral,
                open.text,
                open.line,
                open.column,
            ));
        }

        tracing::debug!(
            tokens = self.tokens.len(),
            skipped_chars = self.skipped_chars,
            "tokenized source"
        );

        TokenStream {
            tokens: self.tokens,
            skipped_chars: self.skipped_chars,
        }
    }
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

/// Length of a string prefix (`r`, `b`, `f`, `u`, `rb`, `fr`, ...) directly
/// followed by a quote, or 0.
fn string_prefix_len(chars: &[char], pos: usize) -> usize {
    let letters = scan_while(chars, pos, |c| {
        matches!(c, 'r' | 'R' | 'b' | 'B' | 'f' | 'F' | 'u' | 'U')
    }) - pos;
    if letters > 0 && letters <= 2 && matches!(chars.get(pos + letters), Some('"' | '\'')) {
        letters
    } else {
        0
    }
}

fn triple_delimiter(chars: &[char], pos: usize) -> Option<&'static str> {
    let window = chars.get(pos..pos + 3)?;
    match window {
        ['"', '"', '"'] => Some("\"\"\""),
        ['\'', '\'', '\''] => Some("'''"),
        _ => None,
    }
}

/// Index of the first unescaped `delimiter` at or after `start`.
fn find_delimiter(chars: &[char], start: usize, delimiter: &str) -> Option<usize> {
    let quote = delimiter.chars().next()?;
    let mut pos = start;
    while pos + 3 <= chars.len() {
        match chars[pos] {
            '\\' => pos += 2,
            c if c == quote && chars[pos + 1] == quote && chars[pos + 2] == quote => {
                return Some(pos)
            }
            _ => pos += 1,
        }
    }
    None
}

/// End index (exclusive) of a single-line string whose body starts at
/// `start`. Unterminated strings run to end of line.
fn scan_string(chars: &[char], start: usize, quote: char) -> usize {
    let mut pos = start;
    while pos < chars.len() {
        match chars[pos] {
            '\\' => pos += 2,
            c if c == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    chars.len()
}
