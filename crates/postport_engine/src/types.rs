use std::fmt;
use std::path::PathBuf;

use postport_logging::{port_debug, port_info, port_warn};

/// Coarse stages of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Enriching,
    Transforming,
    DownloadingImages,
    Writing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Loading => "loading export",
            Phase::Enriching => "enriching posts",
            Phase::Transforming => "transforming posts",
            Phase::DownloadingImages => "downloading images",
            Phase::Writing => "writing files",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    PhaseStarted { phase: Phase, total: usize },
    PostDropped { index: usize, reason: String },
    EnrichmentMissing { post_id: String },
    EnrichmentFailed { post_id: String, error: String },
    ImageSaved { slug: String, url: String, path: PathBuf },
    ImageReused { slug: String, url: String, path: PathBuf },
    ImageFailed { slug: String, url: String, error: FetchError },
    PostWritten { slug: String, path: PathBuf },
    PostPlanned { slug: String, path: PathBuf },
    PostFailed { slug: String, error: String },
}

/// Receives progress from a run. Implementations must tolerate events from
/// concurrent image downloads.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Reports every event through the logging facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::PhaseStarted { phase, total } => port_info!("Started {phase} ({total})"),
            RunEvent::PostDropped { index, reason } => {
                port_warn!("Skipping post #{index}: {reason}")
            }
            RunEvent::EnrichmentMissing { post_id } => {
                port_warn!("No enriched data for post {post_id}; using fallback")
            }
            RunEvent::EnrichmentFailed { post_id, error } => {
                port_warn!("Enrichment failed for post {post_id}: {error}")
            }
            RunEvent::ImageSaved { slug, url, path } => {
                port_debug!("[{slug}] saved {url} -> {}", path.display())
            }
            RunEvent::ImageReused { slug, url, path } => {
                port_debug!("[{slug}] reusing {} for {url}", path.display())
            }
            RunEvent::ImageFailed { slug, url, error } => {
                port_warn!("[{slug}] failed to download {url}: {error}")
            }
            RunEvent::PostWritten { slug, path } => {
                port_debug!("[{slug}] wrote {}", path.display())
            }
            RunEvent::PostPlanned { slug, path } => {
                port_info!("[{slug}] would write {}", path.display())
            }
            RunEvent::PostFailed { slug, error } => {
                port_warn!("[{slug}] could not be written: {error}")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    EmptyBody,
    Network,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::EmptyBody => write!(f, "empty response body"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
