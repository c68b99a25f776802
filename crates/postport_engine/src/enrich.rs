//! Remote enrichment of posts through the Hashnode GraphQL API.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::join_all;
use postport_core::{CoverImage, EnrichmentOrigin, EnrichmentRecord, Reference, ResolvedRef};
use postport_logging::{port_debug, port_info, port_warn};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::types::{ProgressSink, RunEvent};

pub const HASHNODE_ENDPOINT: &str = "https://gql.hashnode.com";

const POST_QUERY: &str = "query GetPost($id: ID!) { \
post(id: $id) { id title tags { id name slug } \
series { id name slug description { text } } \
coverImage { url attribution } publication { id title } } }";

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            endpoint: HASHNODE_ENDPOINT.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Supplies richer metadata for a post, or `None` when it knows nothing
/// about it.
#[async_trait::async_trait]
pub trait EnrichmentSource: Send + Sync {
    async fn fetch(&self, post_id: &str) -> Result<Option<EnrichmentRecord>, EnrichError>;
}

#[derive(Debug, Clone)]
pub struct HashnodeClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HashnodeClient {
    pub fn new(settings: &EnrichSettings) -> Result<Self, EnrichError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(EnrichError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| EnrichError::Request(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl EnrichmentSource for HashnodeClient {
    async fn fetch(&self, post_id: &str) -> Result<Option<EnrichmentRecord>, EnrichError> {
        let payload = json!({ "query": POST_QUERY, "variables": { "id": post_id } });
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .body(serde_json::to_vec(&payload)?)
            .send()
            .await
            .map_err(|err| EnrichError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpStatus(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| EnrichError::Request(err.to_string()))?;
        let parsed: GraphQlResponse = serde_json::from_slice(&body)?;

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(EnrichError::GraphQl(messages.join("; ")));
        }
        Ok(parsed
            .data
            .and_then(|data| data.post)
            .map(RemotePost::into_record))
    }
}

/// Fetches every id in batches of `batch_size`; ids inside a batch are
/// fetched concurrently. Failures are reported and leave the id out of the
/// returned map.
pub async fn enrich_posts(
    source: &dyn EnrichmentSource,
    post_ids: &[String],
    batch_size: usize,
    sink: &dyn ProgressSink,
) -> HashMap<String, EnrichmentRecord> {
    let mut records = HashMap::with_capacity(post_ids.len());
    for (number, batch) in post_ids.chunks(batch_size.max(1)).enumerate() {
        port_info!("Processing batch {} ({} posts)", number + 1, batch.len());
        let results = join_all(
            batch
                .iter()
                .map(|id| async move { (id, source.fetch(id).await) }),
        )
        .await;

        for (id, result) in results {
            match result {
                Ok(Some(record)) => {
                    records.insert(id.clone(), record);
                }
                Ok(None) => {
                    port_debug!("No remote data for post {id}");
                    sink.emit(RunEvent::EnrichmentMissing {
                        post_id: id.clone(),
                    });
                }
                Err(err) => sink.emit(RunEvent::EnrichmentFailed {
                    post_id: id.clone(),
                    error: err.to_string(),
                }),
            }
        }
    }
    if records.len() < post_ids.len() {
        port_warn!(
            "Enriched {} of {} posts; the rest use fallback metadata",
            records.len(),
            post_ids.len()
        );
    } else {
        port_info!("Successfully enriched {} posts", records.len());
    }
    records
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<PostData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct PostData {
    post: Option<RemotePost>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePost {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tags: Option<Vec<ResolvedRef>>,
    #[serde(default)]
    series: Option<ResolvedRef>,
    #[serde(default)]
    cover_image: Option<RemoteCover>,
}

#[derive(Deserialize)]
struct RemoteCover {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    attribution: Option<String>,
}

impl RemotePost {
    // The API has no slug, brief, body or reading time for us; those stay
    // empty so the export's values win during resolution.
    fn into_record(self) -> EnrichmentRecord {
        let mut record = EnrichmentRecord::new(self.id, EnrichmentOrigin::Remote);
        record.title = self.title;
        record.tags = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(Reference::Resolved)
            .collect();
        record.series = self.series.map(Reference::Resolved);
        record.cover_image = self.cover_image.map(|cover| CoverImage {
            url: cover.url,
            attribution: cover.attribution,
        });
        record
    }
}
