//! Escaping raw Markdown so the MDX compiler accepts it
//!
//! Fenced code blocks and inline code spans pass through untouched. In the
//! remaining prose, tag-shaped placeholders such as `<name>` become entities
//! unless they name a standard HTML element, and `<` is neutralised before
//! arrows (`<--`, `<=`) and digits (`<5`). [`EscapeDepth::Strict`] also turns
//! curly braces into entities, since MDX reads them as expressions.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// How aggressively prose is escaped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeDepth {
    /// Angle brackets only
    Markup,
    /// Angle brackets and curly braces
    #[default]
    Strict,
}

impl FromStr for EscapeDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markup" => Ok(EscapeDepth::Markup),
            "strict" => Ok(EscapeDepth::Strict),
            other => Err(format!(
                "unknown escape depth '{other}' (expected 'markup' or 'strict')"
            )),
        }
    }
}

impl fmt::Display for EscapeDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscapeDepth::Markup => "markup",
            EscapeDepth::Strict => "strict",
        })
    }
}

/// Standard HTML element names that are left as real markup
const HTML_TAGS: &[&str] = &[
    "div", "span", "p", "a", "img", "br", "hr", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5",
    "h6", "code", "pre", "blockquote", "table", "tr", "td", "th", "thead", "tbody", "tfoot",
    "colgroup", "col", "strong", "em", "b", "i", "u", "s", "del", "ins", "sub", "sup", "details",
    "summary", "figure", "figcaption", "mark", "small", "cite", "q", "abbr", "dfn", "time", "var",
    "samp", "kbd", "section", "article", "aside", "header", "footer", "nav", "main", "form",
    "input", "button", "select", "option", "textarea", "label", "fieldset", "legend", "dl", "dt",
    "dd", "caption",
];

static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ARROW_RE: OnceLock<Regex> = OnceLock::new();
static DIGIT_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"(?s)```.*?```").expect("fence pattern compiles"))
}

fn inline_code_re() -> &'static Regex {
    INLINE_CODE_RE.get_or_init(|| Regex::new(r"`[^`]+`").expect("inline code pattern compiles"))
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<([A-Za-z][A-Za-z0-9_-]*)>").expect("tag pattern compiles"))
}

fn arrow_re() -> &'static Regex {
    ARROW_RE.get_or_init(|| Regex::new(r"<(-+|=+)").expect("arrow pattern compiles"))
}

fn digit_re() -> &'static Regex {
    DIGIT_RE.get_or_init(|| Regex::new(r"<([0-9])").expect("digit pattern compiles"))
}

/// True when `name` is a standard HTML element, ignoring case
#[must_use]
pub fn is_html_tag(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    HTML_TAGS.contains(&lower.as_str())
}

/// Escape `content` for embedding in an MDX page
#[must_use]
pub fn escape_mdx(content: &str, depth: EscapeDepth) -> String {
    let mut out = String::with_capacity(content.len());
    split_verbatim(content, fence_re(), &mut out, |prose, out| {
        split_verbatim(prose, inline_code_re(), out, |text, out| {
            out.push_str(&escape_prose(text, depth));
        });
    });
    out
}

/// Copy matches of `verbatim` as-is and hand every gap to `escape`
fn split_verbatim<F>(text: &str, verbatim: &Regex, out: &mut String, mut escape: F)
where
    F: FnMut(&str, &mut String),
{
    let mut last = 0;
    for m in verbatim.find_iter(text) {
        escape(&text[last..m.start()], out);
        out.push_str(m.as_str());
        last = m.end();
    }
    escape(&text[last..], out);
}

fn escape_prose(text: &str, depth: EscapeDepth) -> String {
    if text.is_empty() {
        return String::new();
    }

    let tags = tag_re().replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        if is_html_tag(name) {
            caps[0].to_string()
        } else {
            format!("&lt;{name}&gt;")
        }
    });
    let arrows = arrow_re().replace_all(&tags, "&lt;$1");
    let escaped = digit_re().replace_all(&arrows, "&lt;$1");

    match depth {
        EscapeDepth::Markup => escaped.into_owned(),
        EscapeDepth::Strict => escaped.replace('{', "&#123;").replace('}', "&#125;"),
    }
}
