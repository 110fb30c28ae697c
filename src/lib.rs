// src/lib.rs

pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::ScrapeConfig;
pub use error::{ScrapeError, TableSlot};
pub use pipeline::{RunSummary, Scraper};
