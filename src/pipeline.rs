// src/pipeline.rs

use crate::config::{PageSelectors, ScrapeConfig};
use crate::error::{ScrapeError, TableSlot};
use crate::fetch::{
    listing::{parse_listing, CompanyLink},
    Fetcher,
};
use crate::process::{
    locate_tables, merge_balance_sheet, process_summary, process_year_series, NumericTable,
    RawTable,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

pub const MERGED_FILE: &str = "merged_table_3_4_final.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Which step of a table's life an artifact holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Processed,
    Final,
}

impl Stage {
    pub fn file_name(&self, slot: TableSlot) -> String {
        let stem = slot.stem();
        match self {
            Stage::Raw => format!("{stem}.csv"),
            Stage::Processed => format!("{stem}_processed.csv"),
            Stage::Final => format!("{stem}_final.csv"),
        }
    }
}

/// One series table through every stage it reached.
#[derive(Debug)]
pub struct SeriesArtifacts {
    pub slot: TableSlot,
    pub raw: RawTable,
    pub processed: Option<NumericTable>,
    pub final_table: Option<NumericTable>,
}

/// Everything derived from one detail page, before anything touches the disk.
#[derive(Debug, Default)]
pub struct CompanyArtifacts {
    pub summary: Option<NumericTable>,
    pub series: Vec<SeriesArtifacts>,
    pub balance_sheet: Option<NumericTable>,
    pub issues: Vec<ScrapeError>,
}

impl CompanyArtifacts {
    pub fn series(&self, slot: TableSlot) -> Option<&SeriesArtifacts> {
        self.series.iter().find(|s| s.slot == slot)
    }

    pub fn final_table(&self, slot: TableSlot) -> Option<&NumericTable> {
        self.series(slot).and_then(|s| s.final_table.as_ref())
    }

    fn report(&mut self, issue: ScrapeError) {
        warn!(error = %issue, "table skipped");
        self.issues.push(issue);
    }
}

/// Locate, normalize and reshape the four tables of a detail page.
/// A missing or malformed table only costs that table and what depends on it.
pub fn build_artifacts(html: &str, selectors: &PageSelectors) -> CompanyArtifacts {
    let mut tables = locate_tables(html, selectors);
    let mut out = CompanyArtifacts::default();

    match tables.take(TableSlot::Summary) {
        Some(raw) => match process_summary(&raw) {
            Ok(t) => out.summary = Some(t),
            Err(e) => out.report(e),
        },
        None => out.report(ScrapeError::TableMissing {
            table: TableSlot::Summary,
        }),
    }

    for slot in [TableSlot::Results, TableSlot::Assets, TableSlot::Liabilities] {
        let Some(raw) = tables.take(slot) else {
            out.report(ScrapeError::TableMissing { table: slot });
            continue;
        };
        let processed = match process_year_series(&raw, slot) {
            Ok(t) => Some(t),
            Err(e) => {
                out.report(e);
                None
            }
        };
        let final_table = processed.as_ref().map(NumericTable::without_variations);
        out.series.push(SeriesArtifacts {
            slot,
            raw,
            processed,
            final_table,
        });
    }

    let merged = merge_balance_sheet(
        out.final_table(TableSlot::Assets),
        out.final_table(TableSlot::Liabilities),
    );
    match merged {
        Ok(t) => out.balance_sheet = Some(t),
        Err(e) => out.report(e),
    }

    out
}

/// Write every artifact that exists into `dir`, returning the paths written.
pub fn write_artifacts(dir: &Path, artifacts: &CompanyArtifacts) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();

    if let Some(t) = &artifacts.summary {
        let path = dir.join(Stage::Processed.file_name(TableSlot::Summary));
        t.write_csv_file(&path)?;
        written.push(path);
    }

    for s in &artifacts.series {
        let path = dir.join(Stage::Raw.file_name(s.slot));
        s.raw.write_csv_file(&path)?;
        written.push(path);

        for (stage, table) in [
            (Stage::Processed, &s.processed),
            (Stage::Final, &s.final_table),
        ] {
            if let Some(t) = table {
                let path = dir.join(stage.file_name(s.slot));
                t.write_csv_file(&path)?;
                written.push(path);
            }
        }
    }

    if let Some(t) = &artifacts.balance_sheet {
        let path = dir.join(MERGED_FILE);
        t.write_csv_file(&path)?;
        written.push(path);
    }

    Ok(written)
}

/// Directory name for a company: its display name with path separators and
/// control characters replaced.
pub fn company_dir_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

fn has_csv_artifacts(dir: &Path) -> bool {
    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    glob::glob(&pattern)
        .map(|mut paths| paths.any(|p| p.is_ok()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    /// All artifacts written.
    Completed,
    /// Some tables or the merge were skipped.
    Partial,
    /// Detail page could not be fetched or artifacts could not be written.
    Failed,
    /// Output already present, nothing fetched.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub name: String,
    pub url: Url,
    pub status: CompanyStatus,
    pub artifacts: Vec<String>,
    pub issues: Vec<String>,
}

impl CompanyReport {
    fn new(company: &CompanyLink, status: CompanyStatus) -> Self {
        Self {
            name: company.name.clone(),
            url: company.url.clone(),
            status,
            artifacts: Vec::new(),
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub listing_url: Url,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub companies: Vec<CompanyReport>,
}

impl RunSummary {
    pub fn count(&self, status: CompanyStatus) -> usize {
        self.companies.iter().filter(|c| c.status == status).count()
    }
}

/// Sequential scraper: one company is fetched, processed and written before the next.
pub struct Scraper {
    config: ScrapeConfig,
    selectors: PageSelectors,
    fetcher: Fetcher,
}

impl Scraper {
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        config.validate()?;
        let selectors = config.selectors.compile()?;
        let fetcher = Fetcher::new(&config.http)?;
        Ok(Self {
            config,
            selectors,
            fetcher,
        })
    }

    /// Companies listed on the results page. Failing here fails the run.
    pub async fn discover(&self) -> Result<Vec<CompanyLink>> {
        let html = self
            .fetcher
            .get_text(&self.config.listing_url)
            .await
            .context("fetching listing page")?;
        let mut companies = parse_listing(&html, &self.config.base_url, &self.selectors.company_link);
        if let Some(max) = self.config.max_companies {
            companies.truncate(max);
        }
        Ok(companies)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let companies = self.discover().await?;
        info!(count = companies.len(), "companies found");

        let mut reports = Vec::with_capacity(companies.len());
        for (i, company) in companies.iter().enumerate() {
            info!(n = i + 1, of = companies.len(), company = %company.name, "scraping");
            let report = self.process_company(company).await;
            let fetched = report.status != CompanyStatus::Skipped;
            reports.push(report);

            if fetched && i + 1 < companies.len() {
                let pause = self.config.delay.sample();
                if !pause.is_zero() {
                    info!(secs = pause.as_secs(), "pausing before next company");
                    sleep(pause).await;
                }
            }
        }

        let summary = RunSummary {
            listing_url: self.config.listing_url.clone(),
            started_at,
            finished_at: Utc::now(),
            companies: reports,
        };
        self.write_summary(&summary)?;
        info!(
            completed = summary.count(CompanyStatus::Completed),
            partial = summary.count(CompanyStatus::Partial),
            failed = summary.count(CompanyStatus::Failed),
            skipped = summary.count(CompanyStatus::Skipped),
            "all done"
        );
        Ok(summary)
    }

    #[instrument(level = "info", skip_all, fields(company = %company.name))]
    async fn process_company(&self, company: &CompanyLink) -> CompanyReport {
        let dir = self
            .config
            .output_dir
            .join(company_dir_name(&company.name));

        if self.config.skip_existing && has_csv_artifacts(&dir) {
            info!(dir = %dir.display(), "already scraped, skipping");
            return CompanyReport::new(company, CompanyStatus::Skipped);
        }

        let html = match self.fetcher.get_text(&company.url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "detail page unavailable");
                let mut report = CompanyReport::new(company, CompanyStatus::Failed);
                report.issues.push(e.to_string());
                return report;
            }
        };

        let artifacts = build_artifacts(&html, &self.selectors);
        let status = if artifacts.issues.is_empty() {
            CompanyStatus::Completed
        } else {
            CompanyStatus::Partial
        };
        let mut report = CompanyReport::new(company, status);
        report.issues = artifacts.issues.iter().map(|e| e.to_string()).collect();

        match write_artifacts(&dir, &artifacts) {
            Ok(paths) => {
                info!(files = paths.len(), dir = %dir.display(), "artifacts written");
                report.artifacts = paths
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "writing artifacts failed");
                report.status = CompanyStatus::Failed;
                report.issues.push(format!("{e:#}"));
            }
        }
        report
    }

    fn write_summary(&self, summary: &RunSummary) -> Result<()> {
        fs::create_dir_all(&self.config.output_dir)
            .with_context(|| format!("creating {}", self.config.output_dir.display()))?;
        let path = self.config.output_dir.join(SUMMARY_FILE);
        let file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, summary)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
