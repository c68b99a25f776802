//! Markdown documents with YAML frontmatter, one renderer per dialect.
//!
//! Output layout is `---\n<yaml>\n---\n\n<body>`. Absent or empty fields are
//! left out rather than written as `null`.

use std::fmt::{Display, Write as _};

use chrono::NaiveDate;
use thiserror::Error;

use crate::notes::NotesPost;
use crate::site::SitePost;

const DESCRIPTION_INLINE_MAX_CHARS: usize = 80;
const DESCRIPTION_BLOCK_TRIGGERS: [char; 4] = ['"', '\'', ':', '#'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("field '{field}' contains a line break")]
    LineBreak { field: &'static str },
}

/// Site dialect document; falls back to [`minimal_document`] on error.
pub fn render_site(post: &SitePost) -> String {
    try_render_site(post)
        .unwrap_or_else(|_| minimal_document(&post.title, post.date, &post.slug, &post.content))
}

pub fn try_render_site(post: &SitePost) -> Result<String, RenderError> {
    let mut fm = FrontmatterWriter::default();
    fm.quoted("title", &post.title)?;
    fm.plain("date", post.date);
    fm.quoted("permalink", &post.permalink)?;
    fm.quoted("layout", &post.layout)?;
    if !post.excerpt.is_empty() {
        fm.line(format!("excerpt: {}", double_quoted(&post.excerpt)));
    }
    fm.quoted_opt("coverImage", post.cover_image.as_deref())?;
    if post.read_time > 0 {
        fm.plain("readTime", post.read_time);
    }
    fm.sequence("tags", &post.tags, ItemStyle::Quoted)?;
    fm.quoted_opt("series", post.series.as_deref())?;
    Ok(fm.finish(&post.content))
}

/// Notes dialect document; falls back to [`minimal_document`] on error.
pub fn render_notes(post: &NotesPost) -> String {
    try_render_notes(post)
        .unwrap_or_else(|_| minimal_document(&post.title, post.date, &post.slug, &post.content))
}

pub fn try_render_notes(post: &NotesPost) -> Result<String, RenderError> {
    let mut fm = FrontmatterWriter::default();
    fm.quoted("title", &post.title)?;
    fm.quoted_opt("subtitle", post.subtitle.as_deref())?;
    fm.quoted_opt("slug", Some(&post.slug))?;
    if let Some(value) = notes_description(&post.description) {
        fm.line(format!("description: {value}"));
    }
    fm.plain("date", post.date);
    fm.plain("updated", post.updated);
    let status: Vec<&str> = post.status.iter().map(|s| s.as_str()).collect();
    fm.sequence("status", &status, ItemStyle::Bare)?;
    fm.sequence("tags", &post.tags, ItemStyle::Bare)?;
    fm.quoted_opt("series", post.series.as_deref())?;
    if post.reading_time > 0 {
        fm.plain("reading_time", post.reading_time);
    }
    fm.quoted_opt("cover_image", post.cover_image.as_deref())?;
    Ok(fm.finish(&post.content))
}

/// Hand-assembled frontmatter with only title, date and slug.
pub fn minimal_document(title: &str, date: NaiveDate, slug: &str, body: &str) -> String {
    let mut fm = FrontmatterWriter::default();
    fm.line(format!("title: {}", double_quoted(&one_line(title))));
    fm.plain("date", date);
    fm.line(format!("slug: {}", double_quoted(&one_line(slug))));
    fm.finish(body)
}

/// The YAML value for a notes description, or `None` when it is empty.
///
/// Multi-line, long, or punctuation-heavy text becomes a literal block
/// scalar; everything else a double-quoted string. `\r\n` and a lone `\r`
/// count as line breaks. Text with any other control character is always
/// double-quoted since a block scalar cannot escape it.
pub fn notes_description(description: &str) -> Option<String> {
    let description = description.replace("\r\n", "\n").replace('\r', "\n");
    let description = description.trim();
    if description.is_empty() {
        return None;
    }
    let needs_block = description.contains('\n')
        || description.chars().count() > DESCRIPTION_INLINE_MAX_CHARS
        || description.contains(DESCRIPTION_BLOCK_TRIGGERS);
    let block_safe = !description
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t');
    if !needs_block || !block_safe {
        return Some(double_quoted(description));
    }
    let mut value = String::from("|");
    for line in description.split('\n') {
        value.push('\n');
        if !line.is_empty() {
            value.push_str("  ");
            value.push_str(line);
        }
    }
    Some(value)
}

/// `value` as a YAML double-quoted scalar. Every control character is
/// escaped.
pub fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && u32::from(c) <= 0xFF => {
                let _ = write!(out, "\\x{:02X}", u32::from(c));
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy)]
enum ItemStyle {
    Quoted,
    Bare,
}

#[derive(Default)]
struct FrontmatterWriter {
    lines: Vec<String>,
}

impl FrontmatterWriter {
    fn line(&mut self, line: String) {
        self.lines.push(line);
    }

    fn plain(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("{key}: {value}"));
    }

    fn quoted(&mut self, key: &'static str, value: &str) -> Result<(), RenderError> {
        let value = single_line(key, value)?;
        self.lines.push(format!("{key}: {}", double_quoted(value)));
        Ok(())
    }

    fn quoted_opt(&mut self, key: &'static str, value: Option<&str>) -> Result<(), RenderError> {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.quoted(key, value),
            None => Ok(()),
        }
    }

    fn sequence<S: AsRef<str>>(
        &mut self,
        key: &'static str,
        items: &[S],
        style: ItemStyle,
    ) -> Result<(), RenderError> {
        if items.is_empty() {
            return Ok(());
        }
        self.lines.push(format!("{key}:"));
        for item in items {
            let item = single_line(key, item.as_ref())?;
            let rendered = match style {
                ItemStyle::Quoted => double_quoted(item),
                ItemStyle::Bare if is_plain_safe(item) => item.to_string(),
                ItemStyle::Bare => double_quoted(item),
            };
            self.lines.push(format!("  - {rendered}"));
        }
        Ok(())
    }

    fn finish(self, body: &str) -> String {
        format!("---\n{}\n---\n\n{body}", self.lines.join("\n"))
    }
}

fn single_line<'v>(field: &'static str, value: &'v str) -> Result<&'v str, RenderError> {
    if value.contains(['\n', '\r']) {
        Err(RenderError::LineBreak { field })
    } else {
        Ok(value)
    }
}

// Bare sequence items are word characters with inner hyphens only.
fn is_plain_safe(item: &str) -> bool {
    item.chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
        && item
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
