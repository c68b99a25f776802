use crate::clock::Clock;
use crate::extract::{extract_with_source, MarkupConverter, PassthroughConverter};
use crate::model::{EnrichmentRecord, RawPost};

/// Collaborators a dialect transform needs besides the post itself.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub clock: &'a dyn Clock,
    pub markup: &'a dyn MarkupConverter,
}

impl<'a> TransformContext<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            markup: &PassthroughConverter,
        }
    }

    pub fn with_markup(mut self, markup: &'a dyn MarkupConverter) -> Self {
        self.markup = markup;
        self
    }

    /// The extracted body, run through the markup converter when it came
    /// from an HTML field.
    pub(crate) fn body(&self, raw: &RawPost, enriched: Option<&EnrichmentRecord>) -> String {
        let (text, source) = extract_with_source(raw, enriched);
        if source.is_html() {
            self.markup.to_markdown(&text)
        } else {
            text
        }
    }
}
