use postport_core::{
    minimal_document, transform_notes, transform_site, try_render_notes, try_render_site,
    EnrichmentRecord, NotesPost, RawPost, RenderError, RewritableImages, SitePost,
    TransformContext,
};

/// What the run loop needs from a dialect's normalized post.
pub trait DialectPost: RewritableImages + Sized {
    fn transform(
        raw: &RawPost,
        enriched: Option<&EnrichmentRecord>,
        ctx: &TransformContext<'_>,
    ) -> Self;

    fn title(&self) -> &str;
    fn tag_count(&self) -> usize;
    fn series(&self) -> Option<&str>;
    fn is_draft(&self) -> bool;
    fn try_render(&self) -> Result<String, RenderError>;
    fn render_minimal(&self) -> String;
}

impl DialectPost for SitePost {
    fn transform(
        raw: &RawPost,
        enriched: Option<&EnrichmentRecord>,
        ctx: &TransformContext<'_>,
    ) -> Self {
        transform_site(raw, enriched, ctx)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tag_count(&self) -> usize {
        self.tags.len()
    }

    fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    fn is_draft(&self) -> bool {
        false
    }

    fn try_render(&self) -> Result<String, RenderError> {
        try_render_site(self)
    }

    fn render_minimal(&self) -> String {
        minimal_document(&self.title, self.date, &self.slug, &self.content)
    }
}

impl DialectPost for NotesPost {
    fn transform(
        raw: &RawPost,
        enriched: Option<&EnrichmentRecord>,
        ctx: &TransformContext<'_>,
    ) -> Self {
        transform_notes(raw, enriched, ctx)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tag_count(&self) -> usize {
        self.tags.len()
    }

    fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    fn is_draft(&self) -> bool {
        NotesPost::is_draft(self)
    }

    fn try_render(&self) -> Result<String, RenderError> {
        try_render_notes(self)
    }

    fn render_minimal(&self) -> String {
        minimal_document(&self.title, self.date, &self.slug, &self.content)
    }
}
