//! Reads a blog export file into validated posts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use postport_core::{PostRejected, RawPost};
use postport_logging::{port_debug, port_info, port_warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::decode::{decode_export, DecodeError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read export file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export must be a JSON object at the top level")]
    NotAnObject,
    #[error("export has no 'posts' array")]
    MissingPosts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Publication {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPost {
    pub index: usize,
    pub reason: PostRejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportData {
    pub publication: Publication,
    pub posts: Vec<RawPost>,
    pub dropped: Vec<DroppedPost>,
    /// Valid posts in the export before `limit` was applied.
    pub total_valid: usize,
}

pub fn load_export(path: &Path, limit: Option<usize>) -> Result<ExportData, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_export(&bytes)?;
    port_debug!(
        "Read {} bytes from {} ({})",
        bytes.len(),
        path.display(),
        decoded.encoding_label
    );
    parse_export(&decoded.text, limit)
}

/// Validates the top-level shape, then each post. Invalid posts are
/// collected in [`ExportData::dropped`] instead of failing the load.
pub fn parse_export(text: &str, limit: Option<usize>) -> Result<ExportData, LoadError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Object(mut root) = root else {
        return Err(LoadError::NotAnObject);
    };
    let Some(Value::Array(entries)) = root.remove("posts") else {
        return Err(LoadError::MissingPosts);
    };
    let publication = root
        .remove("publication")
        .and_then(|value| serde_json::from_value::<Publication>(value).ok())
        .unwrap_or_default();

    if entries.is_empty() {
        port_warn!("Export contains no posts");
    }

    let mut posts = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match RawPost::from_value(entry) {
            Ok(post) => posts.push(post),
            Err(reason) => {
                port_warn!("Dropping post #{index}: {reason}");
                dropped.push(DroppedPost { index, reason });
            }
        }
    }

    let total_valid = posts.len();
    if let Some(limit) = limit {
        posts.truncate(limit);
    }
    port_info!(
        "Loaded {} of {} posts from publication {}",
        posts.len(),
        total_valid,
        publication.title.as_deref().unwrap_or("(untitled)")
    );

    Ok(ExportData {
        publication,
        posts,
        dropped,
        total_valid,
    })
}
