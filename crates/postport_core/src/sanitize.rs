//! String transforms shared by both output dialects.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const PASSTHROUGH_OPEN: &str = "{% raw %}";
pub const PASSTHROUGH_CLOSE: &str = "{% endraw %}";

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]\n]*)\]\(([^)\n]*)\)").unwrap());
static IMAGE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+(?:align|width|height)="[^"]*""#).unwrap());
static EXTRA_BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static PASSTHROUGH_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{% raw %\}\s*").unwrap());
static PASSTHROUGH_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{% endraw %\}").unwrap());

const TEMPLATE_DELIMITERS: [(&str, &str); 3] = [("{{", "}}"), ("{%", "%}"), ("{#", "#}")];

/// Removes `align`, `width` and `height` attributes trailing image URLs.
///
/// `![a](http://x.jpg align="center" width="50")` becomes `![a](http://x.jpg)`.
pub fn strip_image_attributes(content: &str) -> String {
    IMAGE_RE
        .replace_all(content, |caps: &Captures| {
            let inner = IMAGE_ATTR_RE.replace_all(&caps[2], "");
            format!("![{}]({})", &caps[1], inner)
        })
        .into_owned()
}

pub fn has_template_delimiters(content: &str) -> bool {
    TEMPLATE_DELIMITERS
        .iter()
        .any(|(open, close)| content.contains(open) && content.contains(close))
}

/// Wraps the body in passthrough markers when it carries template syntax.
pub fn wrap_template_delimiters(content: &str) -> String {
    if has_template_delimiters(content) && !content.contains(PASSTHROUGH_OPEN) {
        format!("{PASSTHROUGH_OPEN}\n{content}\n{PASSTHROUGH_CLOSE}")
    } else {
        content.to_string()
    }
}

pub fn strip_passthrough_markers(content: &str) -> String {
    let opened = PASSTHROUGH_OPEN_RE.replace_all(content, "");
    PASSTHROUGH_CLOSE_RE.replace_all(&opened, "").into_owned()
}

/// Collapses runs of blank lines to a single blank line and trims the body.
pub fn normalize_whitespace(content: &str) -> String {
    EXTRA_BLANK_LINES_RE
        .replace_all(content, "\n\n")
        .trim()
        .to_string()
}

/// URL and filename safe identifier: `"Hello, World!"` becomes `"hello-world"`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;
    for c in lowered.chars() {
        if c == '-' || c.is_whitespace() {
            pending_separator = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        }
    }
    slug
}

/// Tag names usable as note-taking tags: `"Next.js"` becomes `"Next_js"`.
///
/// Returns `None` when nothing usable is left.
pub fn clean_tag_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' | '.' => Some('_'),
            '"' | '\'' => None,
            c if c.is_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}
