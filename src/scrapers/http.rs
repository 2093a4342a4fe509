use crate::config::ScoutConfig;
use crate::error::FetchError;
use crate::scrapers::snapshot_path;
use crate::scrapers::traits::{PageRequest, PageSource};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, warn};

/// Page source fetching the server-rendered markup without a browser
pub struct HttpSource {
    client: Client,
    config: ScoutConfig,
    last_page: Option<String>,
}

impl HttpSource {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.ready_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
            last_page: None,
        })
    }
}

impl PageSource for HttpSource {
    fn fetch(&mut self, request: &PageRequest) -> Result<String, FetchError> {
        let url = self.config.page_url(&request.slug, request.page);
        // without rendering to wait for, the settle time only spaces out requests
        thread::sleep(request.settle);

        debug!("Fetching URL: {}", url);
        let load_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::WaitTimeout { url: url.clone() }
            } else {
                FetchError::Load {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = self.client.get(&url).send().map_err(load_error)?;
        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(FetchError::Load {
                url: url.clone(),
                message: format!("status {}", response.status()),
            });
        }

        let html = response.text().map_err(load_error)?;
        debug!("Downloaded {} bytes of HTML", html.len());
        self.last_page = Some(html.clone());
        Ok(html)
    }

    /// Saves the markup of the last fetched page.
    fn snapshot(&mut self, label: &str) -> Result<PathBuf, FetchError> {
        let html = self
            .last_page
            .as_deref()
            .ok_or_else(|| FetchError::Snapshot("no page fetched yet".to_string()))?;

        std::fs::create_dir_all(&self.config.snapshot_dir)
            .map_err(|e| FetchError::Snapshot(e.to_string()))?;
        let path = snapshot_path(&self.config.snapshot_dir, label, "html");
        std::fs::write(&path, html).map_err(|e| FetchError::Snapshot(e.to_string()))?;
        Ok(path)
    }

    fn source_name(&self) -> &'static str {
        "HTTP"
    }
}
