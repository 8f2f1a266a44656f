//! Front matter parsing
//!
//! A document may open with a YAML block fenced by `---` lines. Documents
//! without one parse to empty front matter and the whole text as body.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

static FRONT_MATTER_RE: OnceLock<Regex> = OnceLock::new();
static HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn front_matter_re() -> &'static Regex {
    FRONT_MATTER_RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .expect("front matter pattern compiles")
    })
}

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| {
        Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*\r?$").expect("heading pattern compiles")
    })
}

/// Key/value header of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    /// Scalar value of `key` rendered as text; `None` for missing keys,
    /// nulls, sequences and mappings
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like [`get_str`](Self::get_str) but treats blank strings as missing
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<String> {
        self.get_str(key).filter(|s| !s.trim().is_empty())
    }

    /// True when the document had no front matter or an empty block
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A document split into front matter and body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Parsed header
    pub front_matter: FrontMatter,
    /// Everything after the closing delimiter, untouched
    pub body: String,
}

/// Split `content` into front matter and body
///
/// # Errors
/// Returns the YAML error when a front matter block is present but malformed
pub fn parse_document(content: &str) -> std::result::Result<ParsedDocument, serde_yaml::Error> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(captures) = front_matter_re().captures(content) else {
        return Ok(ParsedDocument {
            front_matter: FrontMatter::default(),
            body: content.to_string(),
        });
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let fields = if yaml.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        }
    };

    Ok(ParsedDocument {
        front_matter: FrontMatter { fields },
        body: body.to_string(),
    })
}

/// Text of the first level-one heading in `content`
#[must_use]
pub fn first_heading(content: &str) -> Option<String> {
    heading_re()
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
