/// A single lexical token of the scanned source.
///
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,

    /// The source text of the token. String literals keep their quotes and
    /// prefix; indent markers hold the leading space run.
    pub text: String,

    /// Line the token starts on.
    pub line: usize,

    /// Character column the token starts at.
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Whether this is the given operator.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Width of an indent marker, zero for any other token.
    #[must_use]
    pub fn indent_width(&self) -> usize {
        match self.kind {
            TokenKind::Indent => self.text.len(),
            _ => 0,
        }
    }

    /// Contents of a string literal without prefix, quotes and escapes.
    ///
    /// Returns `None` for any other kind of token.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::StringLiteral {
            return None;
        }
        let body = self.text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let quote = if body.starts_with("\"\"\"") || body.starts_with("'''") {
            &body[..3]
        } else {
            body.get(..1)?
        };
        let inner = body.strip_prefix(quote)?;
        let inner = inner.strip_suffix(quote).unwrap_or(inner);
        Some(unescape(inner))
    }
}

/// Kinds of tokens. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The `class` keyword.
    ClassKeyword,

    /// The `def` keyword.
    DefKeyword,

    /// The `self` receiver.
    SelfRef,

    /// A quoted string, single-, double- or triple-quoted.
    StringLiteral,

    /// An integer literal.
    NumberLiteral,

    /// Any other name.
    Identifier,

    /// One character from the fixed operator set.
    Operator,

    /// Leading indentation of a line.
    Indent,
}

/// Remove backslash escapes from a quoted string body.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
