use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// A post as it appears in the blog export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content_markdown: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brief: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_references")]
    pub tags: Vec<Reference>,
    #[serde(default, deserialize_with = "lenient_reference")]
    pub series: Option<Reference>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub read_time_in_minutes: Option<u32>,
    /// Legacy reading-time field found in older exports.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub read_time: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,
}

/// Why a post was excluded while loading the export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostRejected {
    #[error("post is not a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' must be a string")]
    NotAString(&'static str),
    #[error("malformed post: {0}")]
    Malformed(String),
}

impl RawPost {
    /// Validates the required fields and deserializes the rest. Optional
    /// fields of an unexpected type are read as absent.
    pub fn from_value(value: Value) -> Result<Self, PostRejected> {
        let object = value.as_object().ok_or(PostRejected::NotAnObject)?;
        for field in ["_id", "title", "slug"] {
            match object.get(field) {
                None => return Err(PostRejected::MissingField(field)),
                Some(Value::String(_)) => {}
                Some(_) => return Err(PostRejected::NotAString(field)),
            }
        }
        serde_json::from_value(value).map_err(|err| PostRejected::Malformed(err.to_string()))
    }
}

/// A tag or series as referenced by a post.
///
/// Exports carry bare ids; enrichment resolves them to named objects. Some
/// exports inline the object directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ReferenceRepr")]
pub enum Reference {
    Unresolved(String),
    Resolved(ResolvedRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ResolvedRef {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReferenceRepr {
    Text(String),
    Number(serde_json::Number),
    Object(ResolvedRef),
}

impl From<ReferenceRepr> for Reference {
    fn from(repr: ReferenceRepr) -> Self {
        match repr {
            ReferenceRepr::Text(id) => Reference::Unresolved(id),
            ReferenceRepr::Number(id) => Reference::Unresolved(id.to_string()),
            ReferenceRepr::Object(resolved) => Reference::Resolved(resolved),
        }
    }
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Unresolved(id) => id,
            Reference::Resolved(resolved) => &resolved.id,
        }
    }

    /// The name shown in frontmatter: a resolved name, else the id.
    pub fn display_name(&self) -> &str {
        match self {
            Reference::Unresolved(id) => id,
            Reference::Resolved(resolved) => resolved
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(&resolved.id),
        }
    }
}

/// Where an enrichment record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOrigin {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnrichedContent {
    pub html: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverImage {
    pub url: Option<String>,
    pub attribution: Option<String>,
}

/// Richer metadata for one post, fetched remotely or synthesized locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub brief: Option<String>,
    pub content: EnrichedContent,
    pub tags: Vec<Reference>,
    pub series: Option<Reference>,
    pub cover_image: Option<CoverImage>,
    pub published_at: Option<String>,
    pub read_time_in_minutes: Option<u32>,
    pub origin: EnrichmentOrigin,
}

impl EnrichmentRecord {
    /// An empty record; every field defers to the export.
    pub fn new(id: impl Into<String>, origin: EnrichmentOrigin) -> Self {
        Self {
            id: id.into(),
            title: None,
            slug: None,
            brief: None,
            content: EnrichedContent::default(),
            tags: Vec::new(),
            series: None,
            cover_image: None,
            published_at: None,
            read_time_in_minutes: None,
            origin,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == EnrichmentOrigin::Fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Published,
    Draft,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        _ => None,
    })
}

// Entries that are neither ids nor objects are skipped.
fn lenient_references<'de, D>(deserializer: D) -> Result<Vec<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(reference_from).collect(),
        _ => Vec::new(),
    })
}

fn lenient_reference<'de, D>(deserializer: D) -> Result<Option<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(reference_from))
}

fn reference_from(value: Value) -> Option<Reference> {
    Reference::deserialize(value).ok()
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// Series descriptions arrive either as plain text or as `{ "text": ... }`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(map)) => map
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}
