// src/fetch/listing.rs

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// A company as it appears on the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyLink {
    /// Anchor text, used as the output directory name.
    pub name: String,
    /// Absolute URL of the company's detail page.
    pub url: Url,
}

/// Collect every company anchor of a results page, resolving hrefs against `base`.
pub fn parse_listing(html: &str, base: &Url, selector: &Selector) -> Vec<CompanyLink> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for anchor in doc.select(selector) {
        let name = anchor.text().collect::<String>().trim().to_string();
        let Some(href) = anchor.value().attr("href") else {
            warn!(%name, "company anchor without href");
            continue;
        };
        if name.is_empty() {
            warn!(href, "company anchor without a name");
            continue;
        }
        match base.join(href) {
            Ok(url) => out.push(CompanyLink { name, url }),
            Err(e) => warn!(href, error = %e, "unusable company href"),
        }
    }

    debug!(companies = out.len(), "listing parsed");
    out
}
