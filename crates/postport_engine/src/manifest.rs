use std::path::{Component, Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::pipeline::RunSummary;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("cannot serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run counts plus one entry per document, paths relative to `root`.
pub fn build_manifest(root: &Path, summary: &RunSummary) -> Value {
    json!({
        "dialect": summary.dialect.as_str(),
        "publication": summary.publication_title,
        "counts": {
            "processed": summary.processed,
            "dropped": summary.dropped,
            "written": summary.documents.len(),
            "failed": summary.failed,
            "with_tags": summary.with_tags,
            "with_series": summary.with_series,
            "with_cover": summary.with_cover,
        },
        "enrichment": {
            "remote": summary.remote_enriched,
            "fallback": summary.fallback_enriched,
        },
        "images": {
            "saved": summary.images.saved,
            "reused": summary.images.reused,
            "failed": summary.images.failed,
            "bytes": summary.images.bytes,
        },
        "posts": summary.documents.iter().map(|doc| {
            json!({
                "slug": doc.slug,
                "title": doc.title,
                "path": relative_path(root, &doc.path),
                "draft": doc.draft,
            })
        }).collect::<Vec<_>>(),
    })
}

pub fn write_manifest(root: &Path, summary: &RunSummary) -> Result<PathBuf, ManifestError> {
    let manifest = build_manifest(root, summary);
    let text = serde_json::to_string_pretty(&manifest)?;
    Ok(AtomicFileWriter::open(root)?.write(MANIFEST_FILE, &text)?)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
