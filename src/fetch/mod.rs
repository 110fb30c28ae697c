// src/fetch/mod.rs

pub mod listing;

use crate::config::HttpConfig;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use reqwest::{
    header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client, StatusCode,
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// HTTP GET with the browser-like headers the site expects.
pub struct Fetcher {
    client: Client,
    referer: String,
    accept_language: String,
    user_agents: Vec<String>,
}

impl Fetcher {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            referer: http.referer.clone(),
            accept_language: http.accept_language.clone(),
            user_agents: http.user_agents.clone(),
        })
    }

    fn user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Body of `url` as text. Anything but a 200 is an error.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text(&self, url: &Url) -> Result<String, ScrapeError> {
        let transport = |source| ScrapeError::Transport {
            url: url.clone(),
            source,
        };

        let resp = self
            .client
            .get(url.clone())
            .header(REFERER, &self.referer)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = resp.text().await.map_err(transport)?;
        debug!(bytes = body.len(), "fetched");
        Ok(body)
    }
}
