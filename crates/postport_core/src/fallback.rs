//! Locally synthesized enrichment for posts the remote source did not cover.
//!
//! Tag and series ids become placeholder names built from the first eight
//! characters of the id (`Tag-xxxxxxxx`, `Series-xxxxxxxx`). Records built
//! here carry [`EnrichmentOrigin::Fallback`].

use std::borrow::Cow;
use std::collections::HashMap;

use crate::model::{
    CoverImage, EnrichedContent, EnrichmentOrigin, EnrichmentRecord, RawPost, Reference,
    ResolvedRef,
};

const ID_PREFIX_CHARS: usize = 8;

impl EnrichmentRecord {
    pub fn fallback_from(raw: &RawPost) -> Self {
        Self {
            id: raw.id.clone(),
            title: non_empty(Some(raw.title.as_str())),
            slug: non_empty(Some(raw.slug.as_str())),
            brief: non_empty(raw.brief.as_deref()),
            content: EnrichedContent {
                html: non_empty(raw.content.as_deref()),
                markdown: non_empty(raw.content_markdown.as_deref()),
            },
            tags: raw.tags.iter().map(fallback_tag).collect(),
            series: raw.series.as_ref().and_then(fallback_series),
            cover_image: non_empty(raw.cover_image.as_deref()).map(|url| CoverImage {
                url: Some(url),
                attribution: None,
            }),
            published_at: non_empty(raw.published_at.as_deref())
                .or(non_empty(raw.date_added.as_deref())),
            read_time_in_minutes: raw.read_time_in_minutes,
            origin: EnrichmentOrigin::Fallback,
        }
    }
}

/// The remote record for `raw` when one exists, else a fallback record.
pub fn enrichment_for<'a>(
    raw: &RawPost,
    remote: &'a HashMap<String, EnrichmentRecord>,
) -> Cow<'a, EnrichmentRecord> {
    match remote.get(&raw.id) {
        Some(record) => Cow::Borrowed(record),
        None => Cow::Owned(EnrichmentRecord::fallback_from(raw)),
    }
}

fn fallback_tag(tag: &Reference) -> Reference {
    match tag {
        Reference::Unresolved(id) => placeholder(id, "Tag-", "tag-"),
        resolved => resolved.clone(),
    }
}

fn fallback_series(series: &Reference) -> Option<Reference> {
    match series {
        Reference::Unresolved(id) if id.is_empty() => None,
        Reference::Unresolved(id) => Some(placeholder(id, "Series-", "series-")),
        resolved => Some(resolved.clone()),
    }
}

fn placeholder(id: &str, name_prefix: &str, slug_prefix: &str) -> Reference {
    let short: String = id.chars().take(ID_PREFIX_CHARS).collect();
    Reference::Resolved(ResolvedRef {
        id: id.to_string(),
        name: Some(format!("{name_prefix}{short}")),
        slug: Some(format!("{slug_prefix}{short}")),
        description: Some(String::new()),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
