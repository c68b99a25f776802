use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use postport_core::{Clock, SystemClock};

pub const DEFAULT_ENRICHMENT_BATCH: usize = 10;
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// Output flavour of the generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Static-site-generator posts with `layout` and `permalink`.
    Site,
    /// Personal-notes vault with drafts kept apart.
    Notes,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Site => "site",
            Dialect::Notes => "notes",
        }
    }

    pub fn default_output_dir(self) -> PathBuf {
        match self {
            Dialect::Site => PathBuf::from("./site"),
            Dialect::Notes => PathBuf::from("./obsidian-vault"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one conversion run needs to know besides its collaborators.
#[derive(Clone)]
pub struct ConvertConfig {
    pub export_file: PathBuf,
    pub output_dir: PathBuf,
    pub dialect: Dialect,
    pub limit: Option<usize>,
    pub skip_enrichment: bool,
    pub skip_images: bool,
    pub dry_run: bool,
    pub convert_html: bool,
    pub write_manifest: bool,
    pub enrichment_batch_size: usize,
    pub image_concurrency: usize,
    pub clock: Arc<dyn Clock>,
}

impl ConvertConfig {
    pub fn new(export_file: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, dialect: Dialect) -> Self {
        Self {
            export_file: export_file.into(),
            output_dir: output_dir.into(),
            dialect,
            limit: None,
            skip_enrichment: false,
            skip_images: false,
            dry_run: false,
            convert_html: false,
            write_manifest: true,
            enrichment_batch_size: DEFAULT_ENRICHMENT_BATCH,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for ConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertConfig")
            .field("export_file", &self.export_file)
            .field("output_dir", &self.output_dir)
            .field("dialect", &self.dialect)
            .field("limit", &self.limit)
            .field("skip_enrichment", &self.skip_enrichment)
            .field("skip_images", &self.skip_images)
            .field("dry_run", &self.dry_run)
            .field("convert_html", &self.convert_html)
            .field("write_manifest", &self.write_manifest)
            .field("enrichment_batch_size", &self.enrichment_batch_size)
            .field("image_concurrency", &self.image_concurrency)
            .finish_non_exhaustive()
    }
}
