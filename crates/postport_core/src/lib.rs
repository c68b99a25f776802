//! Postport core: pure per-post transformation from export records to
//! Markdown documents.
mod clock;
mod context;
mod extract;
mod fallback;
mod frontmatter;
mod images;
mod model;
mod notes;
mod resolve;
mod sanitize;
mod site;

pub use clock::{parse_date, Clock, FixedClock, SystemClock};
pub use context::TransformContext;
pub use extract::{extract, extract_with_source, ContentSource, MarkupConverter, PassthroughConverter};
pub use fallback::enrichment_for;
pub use frontmatter::{
    double_quoted, minimal_document, notes_description, render_notes, render_site,
    try_render_notes, try_render_site, RenderError,
};
pub use images::{
    collect_image_urls, find_image_urls, is_remote, rewrite_urls, ImageMap, RewritableImages,
};
pub use model::{
    CoverImage, EnrichedContent, EnrichmentOrigin, EnrichmentRecord, PostRejected, PostStatus,
    RawPost, Reference, ResolvedRef,
};
pub use notes::{clean_notes_content, transform_notes, NotesPost, NOTES_READ_TIME};
pub use resolve::{
    format_references, format_series, Metadata, MetadataResolver, ReadTimePolicy,
    DEFAULT_READ_TIME, UNTITLED,
};
pub use sanitize::{
    clean_tag_name, has_template_delimiters, normalize_whitespace, slugify,
    strip_image_attributes, strip_passthrough_markers, wrap_template_delimiters,
    PASSTHROUGH_CLOSE, PASSTHROUGH_OPEN,
};
pub use site::{clean_site_content, permalink, transform_site, SitePost, SITE_LAYOUT, SITE_READ_TIME};
