//! Class-attribute metadata: subdivisions, categories and languages.
//!
//! Only literal tuples and lists are read. Anything computed is ignored and
//! the defaults apply.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::find_closing_paren;
use crate::types::DEFAULT_CATEGORY;

/// Language reported when a source declares none.
pub const FALLBACK_LANGUAGE: &str = "en_US";

#[allow(clippy::expect_used)]
static SEQUENCE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(subdivisions|supported_categories|supported_languages)[ \t]*(?::[^=\n]*)?=[ \t]*",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static DEFAULT_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*default_language[ \t]*(?::[^=\n]*)?=[ \t]*["']([^"']+)["']"#)
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static SEQUENCE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]*)"|'([^']*)'|\b([A-Za-z_]\w*)\b"#).expect("valid regex")
});

/// Metadata declared as class attributes of a country source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    pub subdivisions: Vec<String>,
    pub categories: Vec<String>,
    pub languages: Vec<String>,
    pub default_language: Option<String>,
}

impl Default for ClassMetadata {
    fn default() -> Self {
        Self {
            subdivisions: Vec::new(),
            categories: vec![DEFAULT_CATEGORY.to_string()],
            languages: vec![FALLBACK_LANGUAGE.to_string()],
            default_language: None,
        }
    }
}

/// Read the first declaration of each metadata attribute in `text`.
pub fn extract_metadata(text: &str) -> ClassMetadata {
    let mut subdivisions: Option<Vec<String>> = None;
    let mut categories: Option<Vec<String>> = None;
    let mut languages: Option<Vec<String>> = None;

    for caps in SEQUENCE_ATTRIBUTE.captures_iter(text) {
        let (Some(attribute), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let Some(body) = sequence_body(text, whole.end()) else {
            tracing::debug!(attribute = attribute.as_str(), "attribute is not a literal sequence");
            continue;
        };
        match attribute.as_str() {
            "subdivisions" if subdivisions.is_none() => {
                subdivisions = Some(sequence_items(body, false));
            }
            "supported_categories" if categories.is_none() => {
                let items = sequence_items(body, true)
                    .into_iter()
                    .map(|c| c.to_lowercase())
                    .collect();
                categories = Some(items);
            }
            "supported_languages" if languages.is_none() => {
                languages = Some(sequence_items(body, false));
            }
            _ => {}
        }
    }

    let default_language = DEFAULT_LANGUAGE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let mut metadata = ClassMetadata {
        default_language: default_language.clone(),
        ..ClassMetadata::default()
    };
    if let Some(subdivisions) = subdivisions {
        metadata.subdivisions = subdivisions;
    }
    if let Some(categories) = categories.filter(|c| !c.is_empty()) {
        metadata.categories = dedup(categories);
    }
    match (languages.filter(|l| !l.is_empty()), default_language) {
        (Some(languages), _) => metadata.languages = dedup(languages),
        (None, Some(default)) => metadata.languages = vec![default],
        (None, None) => {}
    }
    metadata
}

/// Text inside the tuple or list starting at `start`.
fn sequence_body(text: &str, start: usize) -> Option<&str> {
    let rest = text.get(start..)?;
    match rest.chars().next()? {
        '(' => {
            let close = find_closing_paren(rest, 0)?;
            rest.get(1..close)
        }
        '[' => {
            let close = rest.find(']')?;
            rest.get(1..close)
        }
        _ => None,
    }
}

/// Items of a sequence body; bare names only when `names` is set.
fn sequence_items(body: &str, names: bool) -> Vec<String> {
    body.lines()
        .map(strip_comment)
        .flat_map(|line| {
            SEQUENCE_ITEM
                .captures_iter(line)
                .filter_map(|caps| {
                    caps.get(1)
                        .or_else(|| caps.get(2))
                        .or_else(|| caps.get(3).filter(|_| names))
                        .map(|m| m.as_str().to_string())
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Cut a trailing `#` comment that is not inside a string.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (index, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..index],
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
class Spain(HolidayBase, ChristianHolidays):
    country = "ES"
    default_language = "es"
    subdivisions = (
        "AN",  # Andalucía
        "AR",  # Aragón
        "CT",
    )
    subdivisions_aliases = {"Andalucía": "AN"}
    supported_categories = (OPTIONAL, PUBLIC)
    supported_languages: tuple[str, ...] = ("en_US", "es", "uk")
"#;

    #[test]
    fn test_full_metadata() {
        let metadata = extract_metadata(SOURCE);
        assert_eq!(metadata.subdivisions, vec!["AN", "AR", "CT"]);
        assert_eq!(metadata.categories, vec!["optional", "public"]);
        assert_eq!(metadata.languages, vec!["en_US", "es", "uk"]);
        assert_eq!(metadata.default_language.as_deref(), Some("es"));
    }

    #[test]
    fn test_defaults() {
        let metadata = extract_metadata("class Empty(HolidayBase):\n    country = \"XX\"\n");
        assert_eq!(metadata, ClassMetadata::default());
        assert_eq!(metadata.categories, vec!["public"]);
        assert_eq!(metadata.languages, vec!["en_US"]);
    }

    #[test]
    fn test_default_language_fills_languages() {
        let metadata = extract_metadata("class A:\n    default_language = 'nl'\n");
        assert_eq!(metadata.languages, vec!["nl"]);
    }

    #[test]
    fn test_list_and_computed_values() {
        let text = "class A:\n    subdivisions = ['N', 'S']\n    supported_categories = tuple(CATEGORIES)\n";
        let metadata = extract_metadata(text);
        assert_eq!(metadata.subdivisions, vec!["N", "S"]);
        assert_eq!(metadata.categories, vec!["public"]);
    }

    #[test]
    fn test_first_declaration_wins() {
        let text = "class A:\n    subdivisions = (\"X\",)\nclass B(A):\n    subdivisions = (\"Y\",)\n";
        assert_eq!(extract_metadata(text).subdivisions, vec!["X"]);
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("\"A#B\",  # note"), "\"A#B\",  ");
        assert_eq!(strip_comment("plain"), "plain");
    }
}
