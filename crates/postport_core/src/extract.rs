use crate::model::{EnrichmentRecord, RawPost};

/// The field a post body was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    EnrichedMarkdown,
    EnrichedHtml,
    RawMarkdown,
    RawContent,
    Empty,
}

impl ContentSource {
    /// Whether the text is likely HTML rather than Markdown.
    pub fn is_html(self) -> bool {
        matches!(self, ContentSource::EnrichedHtml | ContentSource::RawContent)
    }
}

/// Picks the canonical body: the first non-empty of enriched markdown,
/// enriched html, export markdown, export content.
pub fn extract(raw: &RawPost, enriched: Option<&EnrichmentRecord>) -> String {
    extract_with_source(raw, enriched).0
}

pub fn extract_with_source(
    raw: &RawPost,
    enriched: Option<&EnrichmentRecord>,
) -> (String, ContentSource) {
    let candidates = [
        (
            enriched.and_then(|e| e.content.markdown.as_deref()),
            ContentSource::EnrichedMarkdown,
        ),
        (
            enriched.and_then(|e| e.content.html.as_deref()),
            ContentSource::EnrichedHtml,
        ),
        (raw.content_markdown.as_deref(), ContentSource::RawMarkdown),
        (raw.content.as_deref(), ContentSource::RawContent),
    ];
    candidates
        .into_iter()
        .find_map(|(text, source)| text.filter(|t| !t.is_empty()).map(|t| (t.to_string(), source)))
        .unwrap_or((String::new(), ContentSource::Empty))
}

/// Turns HTML-like bodies into Markdown before sanitizing.
pub trait MarkupConverter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// Leaves content untouched; bodies are assumed Markdown-like already.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughConverter;

impl MarkupConverter for PassthroughConverter {
    fn to_markdown(&self, html: &str) -> String {
        html.to_string()
    }
}
