use chrono::NaiveDate;

use crate::clock::{parse_date, Clock};
use crate::model::{EnrichmentRecord, PostStatus, RawPost, Reference};
use crate::sanitize::slugify;

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_READ_TIME: u32 = 5;

/// Which export fields are consulted for reading time after the enrichment
/// record. The two dialects historically disagree, so each picks its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadTimePolicy {
    /// `readTimeInMinutes` only.
    #[default]
    MinutesOnly,
    /// The legacy `readTime` field first, then `readTimeInMinutes`.
    LegacyThenMinutes,
}

/// Post metadata after applying field precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub updated: NaiveDate,
    pub description: String,
    pub subtitle: Option<String>,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub cover_image: Option<String>,
    pub read_time: u32,
    pub status: PostStatus,
}

pub struct MetadataResolver<'a> {
    clock: &'a dyn Clock,
    read_time_policy: ReadTimePolicy,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            read_time_policy: ReadTimePolicy::default(),
        }
    }

    pub fn with_read_time(mut self, policy: ReadTimePolicy) -> Self {
        self.read_time_policy = policy;
        self
    }

    /// For every field the enrichment value wins when non-empty, then the
    /// export value, then a computed default.
    pub fn resolve(&self, raw: &RawPost, enriched: Option<&EnrichmentRecord>) -> Metadata {
        let title = first_text([
            enriched.and_then(|e| e.title.as_deref()),
            Some(raw.title.as_str()),
        ])
        .unwrap_or(UNTITLED)
        .to_string();

        let slug = first_text([
            enriched.and_then(|e| e.slug.as_deref()),
            Some(raw.slug.as_str()),
        ])
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&title));

        let date_source = first_text([
            enriched.and_then(|e| e.published_at.as_deref()),
            raw.published_at.as_deref(),
            raw.date_added.as_deref(),
        ]);
        let date = parse_date(date_source, self.clock);
        let updated = parse_date(raw.updated_at.as_deref(), self.clock);

        let description = first_text([
            enriched.and_then(|e| e.brief.as_deref()),
            raw.brief.as_deref(),
        ])
        .map(str::to_string)
        .unwrap_or_else(|| format!("Read about {}", title.to_lowercase()));

        let tag_refs = enriched
            .map(|e| e.tags.as_slice())
            .filter(|tags| !tags.is_empty())
            .unwrap_or(raw.tags.as_slice());
        let series = enriched
            .and_then(|e| e.series.as_ref())
            .or(raw.series.as_ref());

        let cover_image = first_text([
            enriched
                .and_then(|e| e.cover_image.as_ref())
                .and_then(|c| c.url.as_deref()),
            raw.cover_image.as_deref(),
        ])
        .map(str::to_string);

        let status = if raw.is_active.unwrap_or(true) {
            PostStatus::Published
        } else {
            PostStatus::Draft
        };

        Metadata {
            title,
            slug,
            date,
            updated,
            description,
            subtitle: first_text([raw.subtitle.as_deref()]).map(str::to_string),
            tags: format_references(tag_refs),
            series: format_series(series),
            cover_image,
            read_time: self.read_time(raw, enriched),
            status,
        }
    }

    fn read_time(&self, raw: &RawPost, enriched: Option<&EnrichmentRecord>) -> u32 {
        let enriched = enriched.and_then(|e| e.read_time_in_minutes);
        let legacy = match self.read_time_policy {
            ReadTimePolicy::MinutesOnly => None,
            ReadTimePolicy::LegacyThenMinutes => raw.read_time,
        };
        [enriched, legacy, raw.read_time_in_minutes]
            .into_iter()
            .flatten()
            .find(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_READ_TIME)
    }
}

/// Display names of tags in order; duplicates kept, empty names dropped.
pub fn format_references(refs: &[Reference]) -> Vec<String> {
    refs.iter()
        .map(Reference::display_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_series(series: Option<&Reference>) -> Option<String> {
    series
        .map(Reference::display_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn first_text<const N: usize>(candidates: [Option<&str>; N]) -> Option<&str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}
