//! Postport engine: export loading, enrichment, image download and file
//! output around the pure transformation in `postport_core`.
mod config;
mod convert;
mod decode;
mod dialect;
mod download;
mod enrich;
mod fetch;
mod layout;
mod loader;
mod manifest;
mod persist;
mod pipeline;
mod types;

pub use config::{ConvertConfig, Dialect, DEFAULT_ENRICHMENT_BATCH, DEFAULT_IMAGE_CONCURRENCY};
pub use convert::Html2MdConverter;
pub use decode::{decode_export, DecodeError, DecodedText};
pub use dialect::DialectPost;
pub use download::{
    image_extension, plan_images, DownloadReport, ImageDownloader, ImageJob, ImageRole,
    PostImages, DEFAULT_EXTENSION, IMAGE_EXTENSIONS,
};
pub use enrich::{
    enrich_posts, EnrichError, EnrichSettings, EnrichmentSource, HashnodeClient,
    HASHNODE_ENDPOINT,
};
pub use fetch::{FetchSettings, FetchedImage, ImageFetcher, ReqwestImageFetcher};
pub use layout::{safe_stem, FileStems, OutputLayout};
pub use loader::{load_export, parse_export, DroppedPost, ExportData, LoadError, Publication};
pub use manifest::{build_manifest, write_manifest, ManifestError, MANIFEST_FILE};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Converter, DocumentEntry, ImageTotals, RunError, RunSummary};
pub use types::{FailureKind, FetchError, LogSink, NullSink, Phase, ProgressSink, RunEvent};
