//! Downloads a post's remote images next to its document and builds the
//! URL → local reference map used for rewriting.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use postport_core::{collect_image_urls, is_remote, ImageMap};
use postport_logging::port_warn;
use url::Url;

use crate::fetch::ImageFetcher;
use crate::persist::AtomicFileWriter;
use crate::types::{FailureKind, FetchError, ProgressSink, RunEvent};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];
pub const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Cover,
    /// 1-based position among the body's distinct images.
    Inline(usize),
}

impl ImageRole {
    pub fn file_stem(self) -> String {
        match self {
            ImageRole::Cover => "cover".to_string(),
            ImageRole::Inline(n) => format!("image-{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub url: String,
    pub file_name: String,
}

impl ImageJob {
    pub fn new(url: &str, role: ImageRole) -> Self {
        Self {
            url: url.to_string(),
            file_name: format!("{}.{}", role.file_stem(), image_extension(url)),
        }
    }
}

/// Extension of the URL's last path segment when it is a known image
/// type, else `jpg`.
pub fn image_extension(url: &str) -> &'static str {
    let Ok(parsed) = Url::parse(url) else {
        return DEFAULT_EXTENSION;
    };
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .and_then(|ext| IMAGE_EXTENSIONS.iter().copied().find(|known| *known == ext))
        .unwrap_or(DEFAULT_EXTENSION)
}

/// One job per distinct remote URL: the cover first, then body images
/// numbered in order of appearance.
pub fn plan_images(cover_image: Option<&str>, body: &str) -> Vec<ImageJob> {
    let cover = cover_image.map(str::trim).filter(|c| is_remote(c));
    let mut jobs: Vec<ImageJob> = cover
        .map(|url| ImageJob::new(url, ImageRole::Cover))
        .into_iter()
        .collect();
    let inline = collect_image_urls(None, body)
        .into_iter()
        .filter(|url| Some(url.as_str()) != cover);
    for (index, url) in inline.enumerate() {
        jobs.push(ImageJob::new(&url, ImageRole::Inline(index + 1)));
    }
    jobs
}

/// The images of one post and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostImages {
    pub slug: String,
    pub dir: PathBuf,
    pub reference_base: String,
    pub jobs: Vec<ImageJob>,
}

impl PostImages {
    pub fn reference_for(&self, job: &ImageJob) -> String {
        format!("{}/{}", self.reference_base, job.file_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub map: ImageMap,
    pub saved: usize,
    pub reused: usize,
    pub failed: usize,
    pub bytes: u64,
}

enum Outcome {
    Saved { path: PathBuf, bytes: u64 },
    Reused { path: PathBuf },
}

pub struct ImageDownloader {
    fetcher: Arc<dyn ImageFetcher>,
    concurrency: usize,
}

impl ImageDownloader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches every job with bounded concurrency. Failed URLs are reported
    /// and left out of the map so the document keeps the remote URL.
    pub async fn download(&self, target: &PostImages, sink: &dyn ProgressSink) -> DownloadReport {
        let mut report = DownloadReport::default();
        let writer = match AtomicFileWriter::open(&target.dir) {
            Ok(writer) => writer,
            Err(err) => {
                let error = FetchError::new(FailureKind::Io, err.to_string());
                for job in &target.jobs {
                    report.failed += 1;
                    sink.emit(RunEvent::ImageFailed {
                        slug: target.slug.clone(),
                        url: job.url.clone(),
                        error: error.clone(),
                    });
                }
                return report;
            }
        };

        let writer = &writer;
        let outcomes: Vec<_> = stream::iter(target.jobs.iter())
            .map(|job| async move { (job, self.fetch_one(writer, job).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (job, outcome) in outcomes {
            match outcome {
                Ok(Outcome::Saved { path, bytes }) => {
                    report.saved += 1;
                    report.bytes += bytes;
                    sink.emit(RunEvent::ImageSaved {
                        slug: target.slug.clone(),
                        url: job.url.clone(),
                        path,
                    });
                    report.map.insert(job.url.clone(), target.reference_for(job));
                }
                Ok(Outcome::Reused { path }) => {
                    report.reused += 1;
                    sink.emit(RunEvent::ImageReused {
                        slug: target.slug.clone(),
                        url: job.url.clone(),
                        path,
                    });
                    report.map.insert(job.url.clone(), target.reference_for(job));
                }
                Err(error) => {
                    report.failed += 1;
                    sink.emit(RunEvent::ImageFailed {
                        slug: target.slug.clone(),
                        url: job.url.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    async fn fetch_one(
        &self,
        writer: &AtomicFileWriter,
        job: &ImageJob,
    ) -> Result<Outcome, FetchError> {
        let path = writer.dir().join(&job.file_name);
        if fs::metadata(&path).map(|meta| meta.len() > 0).unwrap_or(false) {
            return Ok(Outcome::Reused { path });
        }

        let image = self.fetcher.fetch(&job.url).await?;
        if !image.looks_like_image() {
            port_warn!(
                "{} doesn't appear to be an image (content-type: {})",
                job.url,
                image.content_type.as_deref().unwrap_or_default()
            );
        }
        let path = writer
            .write_bytes(&job.file_name, &image.bytes)
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        Ok(Outcome::Saved {
            path,
            bytes: image.bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_last_path_segment() {
        assert_eq!(image_extension("https://cdn.io/a/photo.PNG?w=300"), "png");
        assert_eq!(image_extension("https://cdn.io/a/photo.webp"), "webp");
        assert_eq!(image_extension("https://cdn.io/a/photo.bmp"), "jpg");
        assert_eq!(image_extension("https://cdn.io/a/photo"), "jpg");
        assert_eq!(image_extension("https://cdn.io.png/"), "jpg");
    }

    #[test]
    fn cover_is_not_numbered_among_inline_images() {
        let body = "![a](https://x.io/a.gif) ![c](https://x.io/cover.png) ![b](https://x.io/b)";
        let jobs = plan_images(Some("https://x.io/cover.png"), body);
        let names: Vec<_> = jobs.iter().map(|j| j.file_name.as_str()).collect();
        assert_eq!(names, vec!["cover.png", "image-1.gif", "image-2.jpg"]);
    }
}
