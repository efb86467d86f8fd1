//! Shallow recovery of class and method boundaries from a token stream.
//!
//! Only headers are modeled: class name, base types, method names and
//! parameters. A class runs until the next `class` keyword; indentation is
//! used only to notice nested classes, which are reported as warnings and
//! listed as ordinary classes.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::StructureError;
use crate::lexer::{Token, TokenKind};

/// A method header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<String>,
    pub line: usize,
}

/// A class header and the methods found after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,

    /// Candidate base type names, dotted names joined (not resolved).
    pub base_types: Vec<String>,

    pub methods: BTreeMap<String, MethodInfo>,

    /// Line of the `class` keyword.
    pub line: usize,

    /// Last line attributed to this class.
    pub end_line: usize,
}

impl ClassInfo {
    /// Lines attributed to this class, header included.
    #[must_use]
    pub fn line_range(&self) -> RangeInclusive<usize> {
        self.line..=self.end_line
    }
}

/// Classes recovered from one token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub classes: Vec<ClassInfo>,

    /// Skipped headers and nesting notices.
    pub warnings: Vec<String>,
}

impl StructureReport {
    /// Line ranges of all recovered classes, in source order.
    #[must_use]
    pub fn class_ranges(&self) -> Vec<RangeInclusive<usize>> {
        self.classes.iter().map(ClassInfo::line_range).collect()
    }
}

/// Recover class and method headers.
pub fn parse_classes(tokens: &[Token]) -> StructureReport {
    let mut report = StructureReport::default();
    let mut current: Option<(ClassInfo, usize)> = None;
    let mut line_indent = 0;
    let mut pos = 0;
    let last_line = tokens.last().map_or(0, |t| t.line);

    while let Some(token) = tokens.get(pos) {
        match token.kind {
            TokenKind::Indent => {
                line_indent = token.indent_width();
                pos += 1;
            }
            TokenKind::ClassKeyword => {
                if let Some((outer, outer_indent)) = current.take() {
                    if line_indent > outer_indent {
                        report.warnings.push(format!(
                            "line {}: nested class inside '{}' is listed as a top-level class",
                            token.line, outer.name
                        ));
                    }
                    report.classes.push(close_class(outer, token.line));
                }

                match parse_class_header(tokens, pos) {
                    Ok((info, next)) => {
                        current = Some((info, line_indent));
                        pos = next;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping class header");
                        report.warnings.push(e.to_string());
                        pos += 1;
                    }
                }
            }
            TokenKind::DefKeyword => {
                let Some((class, _)) = current.as_mut() else {
                    // Module-level function.
                    pos += 1;
                    continue;
                };
                match parse_method(tokens, pos) {
                    Ok((method, next)) => {
                        class.methods.insert(method.name.clone(), method);
                        pos = next;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, class = %class.name, "skipping method header");
                        report.warnings.push(e.to_string());
                        pos += 1;
                    }
                }
            }
            _ => pos += 1,
        }
    }

    if let Some((mut class, _)) = current {
        class.end_line = last_line.max(class.line);
        report.classes.push(class);
    }

    tracing::debug!(
        classes = report.classes.len(),
        warnings = report.warnings.len(),
        "parsed class structure"
    );

    report
}

fn close_class(mut class: ClassInfo, next_class_line: usize) -> ClassInfo {
    class.end_line = next_class_line.saturating_sub(1).max(class.line);
    class
}

/// Parse `class Name(Base, pkg.Other, metaclass=Meta):` starting at the
/// `class` keyword. Returns the class and the index after the colon.
fn parse_class_header(
    tokens: &[Token],
    start: usize,
) -> Result<(ClassInfo, usize), StructureError> {
    let keyword = &tokens[start];
    let name = match tokens.get(start + 1) {
        Some(t) if t.kind == TokenKind::Identifier && t.line == keyword.line => t.text.clone(),
        _ => {
            return Err(StructureError::MissingName {
                keyword: "class",
                line: keyword.line,
            })
        }
    };

    let mut base_types: Vec<String> = Vec::new();
    let mut header = HeaderScanner::new(keyword.line);
    let mut pos = start + 2;
    let mut dotted = false;

    while let Some(token) = tokens.get(pos) {
        match header.step(token) {
            HeaderStep::Done => {
                let info = ClassInfo {
                    name,
                    base_types,
                    methods: BTreeMap::new(),
                    line: keyword.line,
                    end_line: keyword.line,
                };
                return Ok((info, pos + 1));
            }
            HeaderStep::Broken => break,
            HeaderStep::Continue => {}
        }

        match token.kind {
            TokenKind::Identifier if is_keyword_argument(tokens, pos) => {}
            TokenKind::Identifier if dotted => {
                if let Some(last) = base_types.last_mut() {
                    last.push('.');
                    last.push_str(&token.text);
                }
                dotted = false;
            }
            TokenKind::Identifier => base_types.push(token.text.clone()),
            TokenKind::Operator if token.text == "." && !base_types.is_empty() => dotted = true,
            _ => dotted = false,
        }
        pos += 1;
    }

    Err(StructureError::UnterminatedHeader {
        kind: "class",
        name,
        line: keyword.line,
    })
}

/// Parse `def name(self, year: int, *args, flag=True) -> None:` starting at
/// the `def` keyword. Returns the method and the index after the colon.
pub fn parse_method(
    tokens: &[Token],
    start: usize,
) -> Result<(MethodInfo, usize), StructureError> {
    let keyword = &tokens[start];
    let name = match tokens.get(start + 1) {
        Some(t) if t.kind == TokenKind::Identifier && t.line == keyword.line => t.text.clone(),
        _ => {
            return Err(StructureError::MissingName {
                keyword: "def",
                line: keyword.line,
            })
        }
    };

    let mut parameters = Vec::new();
    let mut header = HeaderScanner::new(keyword.line);
    let mut expecting_name = false;
    let mut pos = start + 2;

    while let Some(token) = tokens.get(pos) {
        match header.step(token) {
            HeaderStep::Done => {
                let info = MethodInfo {
                    name,
                    parameters,
                    line: keyword.line,
                };
                return Ok((info, pos + 1));
            }
            HeaderStep::Broken => break,
            HeaderStep::Continue => {}
        }

        let at_parameter_level = header.depth == 1;
        match token.kind {
            TokenKind::Operator if token.text == "(" && header.depth == 1 => expecting_name = true,
            TokenKind::Operator if token.text == "," && at_parameter_level => expecting_name = true,
            TokenKind::Operator if token.text == "*" || token.text == "/" => {}
            TokenKind::Identifier | TokenKind::SelfRef if expecting_name && at_parameter_level => {
                parameters.push(token.text.clone());
                expecting_name = false;
            }
            TokenKind::Indent => {}
            _ => expecting_name = false,
        }
        pos += 1;
    }

    Err(StructureError::UnterminatedHeader {
        kind: "method",
        name,
        line: keyword.line,
    })
}

/// `name=` inside a class header, e.g. `metaclass=ABCMeta`.
fn is_keyword_argument(tokens: &[Token], pos: usize) -> bool {
    tokens.get(pos + 1).is_some_and(|t| t.is_operator("="))
}

enum HeaderStep {
    Continue,
    Done,
    Broken,
}

/// Tracks bracket depth while walking a header up to its colon.
///
/// Headers may continue on later lines only inside brackets.
struct HeaderScanner {
    line: usize,
    depth: usize,
}

impl HeaderScanner {
    fn new(line: usize) -> Self {
        Self { line, depth: 0 }
    }

    fn step(&mut self, token: &Token) -> HeaderStep {
        if token.line != self.line {
            if self.depth == 0 {
                return HeaderStep::Broken;
            }
            self.line = token.line;
        }

        match token.kind {
            TokenKind::ClassKeyword | TokenKind::DefKeyword => HeaderStep::Broken,
            TokenKind::Operator => {
                match token.text.as_str() {
                    "(" | "[" | "{" => self.depth += 1,
                    ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                    ":" if self.depth == 0 => return HeaderStep::Done,
                    _ => {}
                }
                HeaderStep::Continue
            }
            _ => HeaderStep::Continue,
        }
    }
}
