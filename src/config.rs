// src/config.rs

use anyhow::{anyhow, bail, Context, Result};
use rand::Rng;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};
use url::Url;

/// Results page of an already-filtered company search (active companies, sorted by
/// last reported turnover, 25 per page). Only this one page is scraped.
const DEFAULT_LISTING_URL: &str = "https://infonet.fr/recherche-entreprises/1/P2FwZUNvZGVzPSZzZWN0b3JDb2Rlcz0mcG9zdGFsQ29kZXM9JnN0YXR1c2VzPUFjdGl2ZSZsZWdhbEZvcm1zPSZjaXRpZXM9Jm1pblNhbGVzPTI0MTIyMzU4MTc3JmluY2x1ZGVGb3JlaWduZXJzPTAmc29ydEJ5PWxhc3RfZmluYW5jaWFsX2Nsb3Npbmdfc2FsZXMmY3VzdG9tQ29sdW1uTmFtZT1zaXJldCZsaW1pdD0yNQ==";
const DEFAULT_BASE_URL: &str = "https://infonet.fr/";

static DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.2 Safari/605.1.15",
];

/// Everything a run needs, built once at startup and handed to the scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Search results page listing the companies to scrape.
    pub listing_url: Url,
    /// Company hrefs on the listing page are resolved against this.
    pub base_url: Url,
    /// One sub-directory per company is created here.
    pub output_dir: PathBuf,
    pub http: HttpConfig,
    pub delay: DelayConfig,
    pub selectors: SelectorConfig,
    /// Leave companies whose directory already holds CSV files alone.
    pub skip_existing: bool,
    /// Stop after this many companies from the listing.
    pub max_companies: Option<usize>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            listing_url: Url::parse(DEFAULT_LISTING_URL).expect("default listing URL is valid"),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            output_dir: PathBuf::from("companies"),
            http: HttpConfig::default(),
            delay: DelayConfig::default(),
            selectors: SelectorConfig::default(),
            skip_existing: false,
            max_companies: None,
        }
    }
}

impl ScrapeConfig {
    /// Read a YAML file; fields it leaves out keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.user_agents.is_empty() {
            bail!("http.user_agents must hold at least one User-Agent");
        }
        if self.delay.min_secs > self.delay.max_secs {
            bail!(
                "delay.min_secs ({}) is greater than delay.max_secs ({})",
                self.delay.min_secs,
                self.delay.max_secs
            );
        }
        self.selectors.compile()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub referer: String,
    pub accept_language: String,
    /// One is picked at random for every request.
    pub user_agents: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            referer: DEFAULT_BASE_URL.to_string(),
            accept_language: "en-US,en;q=0.9,fr;q=0.8".to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: 30,
        }
    }
}

/// Pause between two companies, drawn uniformly in whole seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_secs: 101,
            max_secs: 301,
        }
    }
}

impl DelayConfig {
    pub fn sample(&self) -> Duration {
        let secs = if self.min_secs >= self.max_secs {
            self.min_secs
        } else {
            rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
        };
        Duration::from_secs(secs)
    }
}

/// CSS selectors describing where things sit on the site's pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Company anchors on the listing page.
    pub company_link: String,
    /// Table 1 on a detail page (first match).
    pub summary_table: String,
    /// Tables 2, 3 and 4 on a detail page (first three matches, in order).
    pub series_table: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            company_link: "a.text-uppercase.font-weight-bold.stretched-link".to_string(),
            summary_table: "table.table.table-hover.border-bottom.m-0".to_string(),
            series_table: "table.table.border-bottom.mb-0".to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn compile(&self) -> Result<PageSelectors> {
        Ok(PageSelectors {
            company_link: parse_selector("company_link", &self.company_link)?,
            summary_table: parse_selector("summary_table", &self.summary_table)?,
            series_table: parse_selector("series_table", &self.series_table)?,
        })
    }
}

/// Parsed form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub company_link: Selector,
    pub summary_table: Selector,
    pub series_table: Selector,
}

fn parse_selector(name: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("selectors.{name}: invalid CSS {css:?}: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = ScrapeConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.http.user_agents.len(), 4);
        assert_eq!(cfg.listing_url.host_str(), Some("infonet.fr"));
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "output_dir: /tmp/out\nmax_companies: 3\ndelay:\n  min_secs: 1\n  max_secs: 2\nhttp:\n  timeout_secs: 5"
        )?;

        let cfg = ScrapeConfig::from_yaml_file(file.path())?;

        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.max_companies, Some(3));
        assert_eq!((cfg.delay.min_secs, cfg.delay.max_secs), (1, 2));
        assert_eq!(cfg.http.timeout_secs, 5);
        assert_eq!(cfg.http.referer, "https://infonet.fr/");
        assert_eq!(cfg.selectors.series_table, "table.table.border-bottom.mb-0");
        Ok(())
    }

    #[test]
    fn validation_catches_bad_settings() {
        let mut cfg = ScrapeConfig::default();
        cfg.http.user_agents.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = ScrapeConfig::default();
        cfg.delay = DelayConfig {
            min_secs: 10,
            max_secs: 1,
        };
        assert!(cfg.validate().is_err());

        let mut cfg = ScrapeConfig::default();
        cfg.selectors.series_table = "table[".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn delay_stays_in_bounds() {
        let delay = DelayConfig {
            min_secs: 2,
            max_secs: 4,
        };
        for _ in 0..100 {
            let d = delay.sample().as_secs();
            assert!((2..=4).contains(&d), "{d} out of range");
        }
        let fixed = DelayConfig {
            min_secs: 0,
            max_secs: 0,
        };
        assert_eq!(fixed.sample(), Duration::ZERO);
    }
}
