mod args;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use postport_engine::{
    Converter, FetchSettings, HashnodeClient, ReqwestImageFetcher, RunSummary,
};
use postport_logging::{port_error, port_info, port_warn};

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    postport_logging::initialize(&cli.log_options());

    match run(&cli).await {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            port_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = cli.convert_config();
    port_info!(
        "Converting {} into {} ({} dialect)",
        config.export_file.display(),
        config.output_dir.display(),
        config.dialect
    );

    let mut converter = Converter::new(config);
    match cli.enrich_settings() {
        Some(settings) => {
            let client = HashnodeClient::new(&settings).context("cannot set up the API client")?;
            converter = converter.with_enrichment(Arc::new(client));
        }
        None if !cli.skip_enrichment => {
            port_warn!("HASHNODE_API_KEY not set; tags and series use fallback names");
        }
        None => {}
    }
    if !cli.skip_images {
        let fetcher = ReqwestImageFetcher::new(FetchSettings::default())
            .context("cannot set up the image downloader")?;
        converter = converter.with_image_fetcher(Arc::new(fetcher));
    }

    converter.run().await.context("conversion failed")
}

fn report(summary: &RunSummary) {
    let verb = if summary.dry_run { "Would write" } else { "Wrote" };
    port_info!("{verb} {} posts", summary.documents.len());
    if summary.dropped > 0 {
        port_warn!("Skipped {} invalid posts from the export", summary.dropped);
    }
    if summary.failed > 0 {
        port_warn!("{} posts could not be written", summary.failed);
    }
    port_info!(
        "Enrichment: {} from the API, {} fallback",
        summary.remote_enriched,
        summary.fallback_enriched
    );
    if let Some(path) = &summary.manifest_path {
        port_info!("Manifest: {}", path.display());
    }
}
