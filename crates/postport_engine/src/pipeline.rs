//! One conversion run: load, enrich, transform, download images, write.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use postport_core::{
    enrichment_for, EnrichmentRecord, MarkupConverter, NotesPost, PassthroughConverter, RawPost,
    SitePost, TransformContext,
};
use postport_logging::{port_info, port_warn};
use thiserror::Error;

use crate::config::{ConvertConfig, Dialect};
use crate::convert::Html2MdConverter;
use crate::dialect::DialectPost;
use crate::download::{plan_images, DownloadReport, ImageDownloader, PostImages};
use crate::enrich::{enrich_posts, EnrichmentSource};
use crate::fetch::ImageFetcher;
use crate::layout::{FileStems, OutputLayout};
use crate::loader::{load_export, ExportData, LoadError};
use crate::manifest::write_manifest;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::{LogSink, Phase, ProgressSink, RunEvent};

/// Failures that stop the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Output(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub slug: String,
    pub title: String,
    pub path: PathBuf,
    pub draft: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageTotals {
    pub saved: usize,
    pub reused: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl ImageTotals {
    fn add(&mut self, report: &DownloadReport) {
        self.saved += report.saved;
        self.reused += report.reused;
        self.failed += report.failed;
        self.bytes += report.bytes;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dialect: Dialect,
    pub dry_run: bool,
    pub publication_title: Option<String>,
    pub processed: usize,
    pub dropped: usize,
    pub with_tags: usize,
    pub with_series: usize,
    pub with_cover: usize,
    pub remote_enriched: usize,
    pub fallback_enriched: usize,
    pub images: ImageTotals,
    /// Written documents, or planned ones on a dry run.
    pub documents: Vec<DocumentEntry>,
    pub failed: usize,
    pub manifest_path: Option<PathBuf>,
}

impl RunSummary {
    fn new(config: &ConvertConfig, export: &ExportData) -> Self {
        Self {
            dialect: config.dialect,
            dry_run: config.dry_run,
            publication_title: export.publication.title.clone(),
            processed: 0,
            dropped: export.dropped.len(),
            with_tags: 0,
            with_series: 0,
            with_cover: 0,
            remote_enriched: 0,
            fallback_enriched: 0,
            images: ImageTotals::default(),
            documents: Vec::new(),
            failed: 0,
            manifest_path: None,
        }
    }
}

/// One writer per document directory; drafts share `posts/` in the site
/// dialect.
struct DocumentWriters {
    published: AtomicFileWriter,
    drafts: AtomicFileWriter,
}

impl DocumentWriters {
    fn open(layout: &OutputLayout) -> Result<Self, PersistError> {
        Ok(Self {
            published: AtomicFileWriter::open(layout.document_dir(false))?,
            drafts: AtomicFileWriter::open(layout.document_dir(true))?,
        })
    }

    fn for_draft(&self, draft: bool) -> &AtomicFileWriter {
        if draft {
            &self.drafts
        } else {
            &self.published
        }
    }
}

struct PreparedPost<P> {
    stem: String,
    post: P,
}

/// Drives a run. Collaborators are optional: without an enrichment source
/// every post uses fallback metadata, without an image fetcher remote
/// image URLs stay in place.
pub struct Converter {
    config: ConvertConfig,
    enrichment: Option<Arc<dyn EnrichmentSource>>,
    images: Option<Arc<dyn ImageFetcher>>,
    sink: Arc<dyn ProgressSink>,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            enrichment: None,
            images: None,
            sink: Arc::new(LogSink),
        }
    }

    pub fn with_enrichment(mut self, source: Arc<dyn EnrichmentSource>) -> Self {
        self.enrichment = Some(source);
        self
    }

    pub fn with_image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.images = Some(fetcher);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunSummary, RunError> {
        self.sink.emit(RunEvent::PhaseStarted {
            phase: Phase::Loading,
            total: 1,
        });
        let export = load_export(&self.config.export_file, self.config.limit)?;
        for dropped in &export.dropped {
            self.sink.emit(RunEvent::PostDropped {
                index: dropped.index,
                reason: dropped.reason.to_string(),
            });
        }
        if self.config.limit.is_some_and(|limit| limit < export.total_valid) {
            port_info!(
                "Limited to {} of {} posts",
                export.posts.len(),
                export.total_valid
            );
        }

        let remote = self.enrich(&export.posts).await;
        match self.config.dialect {
            Dialect::Site => self.convert::<SitePost>(&export, &remote).await,
            Dialect::Notes => self.convert::<NotesPost>(&export, &remote).await,
        }
    }

    async fn enrich(&self, posts: &[RawPost]) -> HashMap<String, EnrichmentRecord> {
        if self.config.skip_enrichment {
            port_info!("Skipping API enrichment as requested; tags use fallback names");
            return HashMap::new();
        }
        let Some(source) = self.enrichment.as_deref() else {
            port_info!("Skipping API enrichment (no API key); tags use fallback names");
            return HashMap::new();
        };
        self.sink.emit(RunEvent::PhaseStarted {
            phase: Phase::Enriching,
            total: posts.len(),
        });
        let ids: Vec<String> = posts.iter().map(|post| post.id.clone()).collect();
        enrich_posts(
            source,
            &ids,
            self.config.enrichment_batch_size,
            self.sink.as_ref(),
        )
        .await
    }

    async fn convert<P: DialectPost>(
        &self,
        export: &ExportData,
        remote: &HashMap<String, EnrichmentRecord>,
    ) -> Result<RunSummary, RunError> {
        let sink = self.sink.as_ref();
        let layout = OutputLayout::new(&self.config.output_dir, self.config.dialect);
        let mut summary = RunSummary::new(&self.config, export);

        sink.emit(RunEvent::PhaseStarted {
            phase: Phase::Transforming,
            total: export.posts.len(),
        });
        let mut prepared = self.transform_all::<P>(export, remote, &mut summary);

        let writers = if self.config.dry_run {
            None
        } else {
            layout.prepare()?;
            Some(DocumentWriters::open(&layout)?)
        };

        if let Some(downloader) = self.downloader() {
            sink.emit(RunEvent::PhaseStarted {
                phase: Phase::DownloadingImages,
                total: prepared.len(),
            });
            for item in &mut prepared {
                let jobs = plan_images(item.post.cover_image(), item.post.body());
                if jobs.is_empty() {
                    continue;
                }
                let target = PostImages {
                    slug: item.post.slug().to_string(),
                    dir: layout.post_image_dir(&item.stem),
                    reference_base: layout.image_reference_base(&item.stem),
                    jobs,
                };
                let report = downloader.download(&target, sink).await;
                item.post.rewrite_images(&report.map);
                summary.images.add(&report);
            }
            port_info!(
                "Images: {} saved, {} already present, {} failed ({} bytes)",
                summary.images.saved,
                summary.images.reused,
                summary.images.failed,
                summary.images.bytes
            );
        }

        sink.emit(RunEvent::PhaseStarted {
            phase: Phase::Writing,
            total: prepared.len(),
        });
        for item in &prepared {
            self.write_document(&layout, writers.as_ref(), item, &mut summary);
        }

        if self.config.write_manifest && !self.config.dry_run {
            match write_manifest(layout.root(), &summary) {
                Ok(path) => summary.manifest_path = Some(path),
                Err(err) => port_warn!("Could not write manifest: {err}"),
            }
        }

        port_info!(
            "Processed {} posts ({} with tags, {} with series, {} with cover images)",
            summary.processed,
            summary.with_tags,
            summary.with_series,
            summary.with_cover
        );
        Ok(summary)
    }

    fn transform_all<P: DialectPost>(
        &self,
        export: &ExportData,
        remote: &HashMap<String, EnrichmentRecord>,
        summary: &mut RunSummary,
    ) -> Vec<PreparedPost<P>> {
        let markup: &dyn MarkupConverter = if self.config.convert_html {
            &Html2MdConverter
        } else {
            &PassthroughConverter
        };
        let ctx = TransformContext::new(self.config.clock.as_ref()).with_markup(markup);
        let mut stems = FileStems::new();

        export
            .posts
            .iter()
            .map(|raw| {
                let enriched = enrichment_for(raw, remote);
                if enriched.is_fallback() {
                    summary.fallback_enriched += 1;
                } else {
                    summary.remote_enriched += 1;
                }
                let post = P::transform(raw, Some(&*enriched), &ctx);

                summary.processed += 1;
                summary.with_tags += usize::from(post.tag_count() > 0);
                summary.with_series += usize::from(post.series().is_some());
                summary.with_cover += usize::from(post.cover_image().is_some());

                let stem = stems.assign(post.slug(), &raw.id);
                PreparedPost { stem, post }
            })
            .collect()
    }

    fn downloader(&self) -> Option<ImageDownloader> {
        if self.config.skip_images {
            port_info!("Skipping image downloads; documents keep remote URLs");
            return None;
        }
        if self.config.dry_run {
            return None;
        }
        let fetcher = self.images.clone()?;
        Some(ImageDownloader::new(fetcher, self.config.image_concurrency))
    }

    fn write_document<P: DialectPost>(
        &self,
        layout: &OutputLayout,
        writers: Option<&DocumentWriters>,
        item: &PreparedPost<P>,
        summary: &mut RunSummary,
    ) {
        let slug = item.post.slug().to_string();
        let draft = item.post.is_draft();
        let entry = |path: PathBuf| DocumentEntry {
            slug: slug.clone(),
            title: item.post.title().to_string(),
            path,
            draft,
        };

        let Some(writers) = writers else {
            let path = layout.document_path(&item.stem, draft);
            self.sink.emit(RunEvent::PostPlanned {
                slug: slug.clone(),
                path: path.clone(),
            });
            summary.documents.push(entry(path));
            return;
        };

        let document = render_document(&item.post);
        match writers.for_draft(draft).write(&format!("{}.md", item.stem), &document) {
            Ok(path) => {
                self.sink.emit(RunEvent::PostWritten {
                    slug: slug.clone(),
                    path: path.clone(),
                });
                summary.documents.push(entry(path));
            }
            Err(err) => {
                summary.failed += 1;
                self.sink.emit(RunEvent::PostFailed {
                    slug: slug.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
}

fn render_document<P: DialectPost>(post: &P) -> String {
    post.try_render().unwrap_or_else(|err| {
        port_warn!(
            "[{}] frontmatter rendering failed ({err}); writing minimal frontmatter",
            post.slug()
        );
        post.render_minimal()
    })
}
