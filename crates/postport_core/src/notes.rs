//! Personal-notes dialect: cleaned tag names, status list, and bodies free of
//! the site dialect's passthrough markers.

use chrono::NaiveDate;

use crate::context::TransformContext;
use crate::images::RewritableImages;
use crate::model::{EnrichmentRecord, PostStatus, RawPost};
use crate::resolve::{MetadataResolver, ReadTimePolicy};
use crate::sanitize::{
    clean_tag_name, normalize_whitespace, strip_image_attributes, strip_passthrough_markers,
};

pub const NOTES_READ_TIME: ReadTimePolicy = ReadTimePolicy::LegacyThenMinutes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesPost {
    pub title: String,
    pub subtitle: Option<String>,
    pub slug: String,
    pub description: String,
    pub date: NaiveDate,
    pub updated: NaiveDate,
    pub status: Vec<PostStatus>,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub reading_time: u32,
    pub cover_image: Option<String>,
    pub content: String,
}

impl NotesPost {
    pub fn is_draft(&self) -> bool {
        self.status.contains(&PostStatus::Draft)
    }
}

pub fn transform_notes(
    raw: &RawPost,
    enriched: Option<&EnrichmentRecord>,
    ctx: &TransformContext<'_>,
) -> NotesPost {
    let content = clean_notes_content(&ctx.body(raw, enriched));
    let meta = MetadataResolver::new(ctx.clock)
        .with_read_time(NOTES_READ_TIME)
        .resolve(raw, enriched);

    NotesPost {
        title: meta.title,
        subtitle: meta.subtitle,
        slug: meta.slug,
        description: meta.description,
        date: meta.date,
        updated: meta.updated,
        status: vec![meta.status],
        tags: meta
            .tags
            .iter()
            .filter_map(|tag| clean_tag_name(tag))
            .collect(),
        series: meta.series,
        reading_time: meta.read_time,
        cover_image: meta.cover_image,
        content,
    }
}

pub fn clean_notes_content(content: &str) -> String {
    let content = strip_passthrough_markers(content);
    let content = strip_image_attributes(&content);
    normalize_whitespace(&content)
}

impl RewritableImages for NotesPost {
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
