//! Where each dialect puts documents and images.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::Dialect;
use crate::persist::{ensure_output_dir, PersistError};

const MAX_STEM_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    dialect: Dialect,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, dialect: Dialect) -> Self {
        Self {
            root: root.into(),
            dialect,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join("posts")
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.root.join("drafts")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images").join("posts")
    }

    /// Every directory this dialect writes into.
    pub fn directories(&self) -> Vec<PathBuf> {
        match self.dialect {
            Dialect::Site => vec![self.posts_dir(), self.images_dir()],
            Dialect::Notes => vec![
                self.posts_dir(),
                self.drafts_dir(),
                self.templates_dir(),
                self.images_dir(),
            ],
        }
    }

    pub fn prepare(&self) -> Result<(), PersistError> {
        self.directories()
            .iter()
            .try_for_each(|dir| ensure_output_dir(dir))
    }

    /// Drafts are only separated in the notes dialect.
    pub fn document_dir(&self, draft: bool) -> PathBuf {
        match (self.dialect, draft) {
            (Dialect::Notes, true) => self.drafts_dir(),
            _ => self.posts_dir(),
        }
    }

    pub fn document_path(&self, stem: &str, draft: bool) -> PathBuf {
        self.document_dir(draft).join(format!("{stem}.md"))
    }

    pub fn post_image_dir(&self, stem: &str) -> PathBuf {
        self.images_dir().join(stem)
    }

    /// How a document refers to its images: site-absolute for the site
    /// dialect, relative to the document folder for notes.
    pub fn image_reference_base(&self, stem: &str) -> String {
        match self.dialect {
            Dialect::Site => format!("/images/posts/{stem}"),
            Dialect::Notes => format!("../images/posts/{stem}"),
        }
    }
}

/// Hands out unique, filesystem-safe file stems for the posts of one run.
#[derive(Debug, Default)]
pub struct FileStems {
    used: HashSet<String>,
}

impl FileStems {
    pub fn new() -> Self {
        Self::default()
    }

    /// The safe form of `slug`, suffixed with `--<hash of post id>` when an
    /// earlier post already claimed it.
    pub fn assign(&mut self, slug: &str, post_id: &str) -> String {
        let base = safe_stem(slug);
        let key = base.to_lowercase();
        if self.used.insert(key) {
            return base;
        }
        let mut candidate = format!("{base}--{}", short_hash(post_id));
        let mut attempt = 1u32;
        while !self.used.insert(candidate.to_lowercase()) {
            attempt += 1;
            candidate = format!("{base}--{}", short_hash(&format!("{post_id}#{attempt}")));
        }
        candidate
    }
}

/// Forbidden path characters become `_`, runs of `_` collapse, reserved
/// Windows device names gain a trailing `_`, and an empty result is
/// `untitled`.
pub fn safe_stem(slug: &str) -> String {
    let cleaned: String = slug
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    let mut stem = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars().take(MAX_STEM_CHARS) {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        stem.push(c);
    }
    if stem.is_empty() {
        stem.push_str("untitled");
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
