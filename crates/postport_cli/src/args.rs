//! Command-line surface and its mapping onto a [`ConvertConfig`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use postport_engine::{ConvertConfig, Dialect, EnrichSettings, DEFAULT_IMAGE_CONCURRENCY};
use postport_logging::LogOptions;

#[derive(Parser, Debug)]
#[command(name = "postport", version, about = "Convert a Hashnode export into Markdown posts")]
pub struct Cli {
    /// Path to the Hashnode JSON export
    #[arg(value_name = "EXPORT_FILE")]
    pub export_file: PathBuf,

    /// Output flavour
    #[arg(short, long, value_enum, default_value_t = DialectArg::Notes)]
    pub dialect: DialectArg,

    /// Output directory (defaults to ./site or ./obsidian-vault)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only convert the first N valid posts
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Don't query the Hashnode API for tags and series
    #[arg(long)]
    pub skip_enrichment: bool,

    /// Keep remote image URLs instead of downloading them
    #[arg(long)]
    pub skip_images: bool,

    /// Hashnode personal access token
    #[arg(long, env = "HASHNODE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Report what would be written without touching the disk
    #[arg(long)]
    pub dry_run: bool,

    /// Convert HTML bodies to Markdown
    #[arg(long)]
    pub convert_html: bool,

    /// Don't write manifest.json
    #[arg(long)]
    pub no_manifest: bool,

    /// Parallel image downloads per post
    #[arg(long, default_value_t = DEFAULT_IMAGE_CONCURRENCY)]
    pub image_concurrency: usize,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Static-site posts (11ty style)
    Site,
    /// Personal-notes vault (Obsidian style)
    Notes,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Site => Dialect::Site,
            DialectArg::Notes => Dialect::Notes,
        }
    }
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            verbose: self.verbose,
            file: self.log_file.clone(),
        }
    }

    pub fn convert_config(&self) -> ConvertConfig {
        let dialect = Dialect::from(self.dialect);
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| dialect.default_output_dir());
        let mut config = ConvertConfig::new(&self.export_file, output, dialect);
        config.limit = self.limit;
        config.skip_enrichment = self.skip_enrichment;
        config.skip_images = self.skip_images;
        config.dry_run = self.dry_run;
        config.convert_html = self.convert_html;
        config.write_manifest = !self.no_manifest;
        config.image_concurrency = self.image_concurrency;
        config
    }

    /// Enrichment settings, or `None` when enrichment is off or no key is set.
    pub fn enrich_settings(&self) -> Option<EnrichSettings> {
        if self.skip_enrichment {
            return None;
        }
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())?;
        Some(EnrichSettings {
            api_key: Some(api_key.to_string()),
            ..EnrichSettings::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("postport").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn output_defaults_follow_the_dialect() {
        let notes = parse(&["export.json"]).convert_config();
        assert_eq!(notes.dialect, Dialect::Notes);
        assert_eq!(notes.output_dir, PathBuf::from("./obsidian-vault"));
        assert!(notes.write_manifest);

        let site = parse(&["export.json", "--dialect", "site"]).convert_config();
        assert_eq!(site.output_dir, PathBuf::from("./site"));
    }

    #[test]
    fn flags_map_onto_the_config() {
        let cli = parse(&[
            "export.json",
            "-o",
            "out",
            "-l",
            "3",
            "--skip-images",
            "--dry-run",
            "--convert-html",
            "--no-manifest",
            "--image-concurrency",
            "8",
        ]);
        let config = cli.convert_config();
        assert_eq!(config.export_file, PathBuf::from("export.json"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.limit, Some(3));
        assert!(config.skip_images && config.dry_run && config.convert_html);
        assert!(!config.write_manifest);
        assert_eq!(config.image_concurrency, 8);
    }

    #[test]
    fn enrichment_needs_a_key_and_no_skip_flag() {
        assert!(parse(&["e.json", "--api-key", "  "]).enrich_settings().is_none());
        assert!(parse(&["e.json", "--api-key", "k", "--skip-enrichment"])
            .enrich_settings()
            .is_none());
        let settings = parse(&["e.json", "--api-key", " k "]).enrich_settings().unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("k"));
    }
}
