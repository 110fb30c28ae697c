// src/main.rs

use anyhow::Result;
use clap::Parser;
use infonet_scraper::{pipeline::SUMMARY_FILE, ScrapeConfig, Scraper};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "infonet-scraper")]
#[command(about = "Scrape company financial tables from infonet.fr into per-company CSV files")]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search results page to read companies from
    #[arg(long)]
    listing_url: Option<Url>,

    /// Root directory for the per-company outputs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only scrape the first N companies of the listing
    #[arg(long)]
    max_companies: Option<usize>,

    /// Lower bound of the pause between companies, in seconds
    #[arg(long)]
    min_delay: Option<u64>,

    /// Upper bound of the pause between companies, in seconds
    #[arg(long)]
    max_delay: Option<u64>,

    /// Skip companies whose directory already holds CSV files
    #[arg(long)]
    skip_existing: bool,
}

impl Args {
    fn into_config(self) -> Result<ScrapeConfig> {
        let mut cfg = match &self.config {
            Some(path) => ScrapeConfig::from_yaml_file(path)?,
            None => ScrapeConfig::default(),
        };
        if let Some(url) = self.listing_url {
            cfg.listing_url = url;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if self.max_companies.is_some() {
            cfg.max_companies = self.max_companies;
        }
        if let Some(secs) = self.min_delay {
            cfg.delay.min_secs = secs;
        }
        if let Some(secs) = self.max_delay {
            cfg.delay.max_secs = secs;
        }
        cfg.skip_existing |= self.skip_existing;
        Ok(cfg)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,infonet_scraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) layer config: defaults, YAML, flags ──────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        listing = %cfg.listing_url,
        output = %cfg.output_dir.display(),
        min_delay = cfg.delay.min_secs,
        max_delay = cfg.delay.max_secs,
        "configured"
    );

    // ─── 3) scrape every listed company ──────────────────────────────
    let scraper = Scraper::new(cfg)?;
    let summary = scraper.run().await?;

    info!(
        companies = summary.companies.len(),
        summary = SUMMARY_FILE,
        "finished"
    );
    Ok(())
}
