//! Static-site-generator dialect: `layout`/`permalink` frontmatter and
//! bodies wrapped in passthrough markers when they contain template syntax.

use chrono::NaiveDate;

use crate::context::TransformContext;
use crate::images::RewritableImages;
use crate::model::{EnrichmentRecord, RawPost};
use crate::resolve::{MetadataResolver, ReadTimePolicy};
use crate::sanitize::{normalize_whitespace, strip_image_attributes, wrap_template_delimiters};

pub const SITE_LAYOUT: &str = "post";
pub const SITE_READ_TIME: ReadTimePolicy = ReadTimePolicy::MinutesOnly;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePost {
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub cover_image: Option<String>,
    pub read_time: u32,
    pub content: String,
    pub layout: String,
    pub permalink: String,
}

pub fn transform_site(
    raw: &RawPost,
    enriched: Option<&EnrichmentRecord>,
    ctx: &TransformContext<'_>,
) -> SitePost {
    let content = clean_site_content(&ctx.body(raw, enriched));
    let meta = MetadataResolver::new(ctx.clock)
        .with_read_time(SITE_READ_TIME)
        .resolve(raw, enriched);

    SitePost {
        permalink: permalink(&meta.slug),
        title: meta.title,
        slug: meta.slug,
        date: meta.date,
        excerpt: meta.description,
        tags: meta.tags,
        series: meta.series,
        cover_image: meta.cover_image,
        read_time: meta.read_time,
        content,
        layout: SITE_LAYOUT.to_string(),
    }
}

pub fn clean_site_content(content: &str) -> String {
    let content = strip_image_attributes(content);
    let content = wrap_template_delimiters(&content);
    normalize_whitespace(&content)
}

pub fn permalink(slug: &str) -> String {
    format!("/{slug}/")
}

impl RewritableImages for SitePost {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    fn image_fields_mut(&mut self) -> (&mut String, &mut Option<String>) {
        (&mut self.content, &mut self.cover_image)
    }
}
