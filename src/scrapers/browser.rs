use crate::config::ScoutConfig;
use crate::error::FetchError;
use crate::scrapers::snapshot_path;
use crate::scrapers::traits::{PageRequest, PageSource};
use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Element that must exist before a page counts as loaded
const READY_SELECTOR: &str = "body";

/// How long to look for the cookie banner button
const CONSENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page source driving headless Chrome, one tab for the whole run
pub struct BrowserSource {
    // keeps the Chrome process alive, it is killed on drop
    _browser: Browser,
    tab: Arc<Tab>,
    config: ScoutConfig,
}

impl BrowserSource {
    /// Launch Chrome and open the tab used for every page
    pub fn launch(config: &ScoutConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some(config.window_size))
            .args(vec![OsStr::new("--disable-dev-shm-usage")])
            .idle_browser_timeout(config.ready_timeout().max(Duration::from_secs(300)))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(config.ready_timeout());
        tab.set_user_agent(&config.user_agent, None, None)
            .context("Failed to set user agent")?;

        Ok(Self {
            _browser: browser,
            tab,
            config: config.clone(),
        })
    }

    fn open(&self, url: &str) -> Result<(), FetchError> {
        debug!("Navigating to {}", url);
        self.tab.navigate_to(url).map_err(|e| FetchError::Load {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.tab
            .wait_until_navigated()
            .and_then(|tab| tab.wait_for_element_with_custom_timeout(READY_SELECTOR, self.config.ready_timeout()))
            .map_err(|_| FetchError::WaitTimeout { url: url.to_string() })?;
        Ok(())
    }
}

impl PageSource for BrowserSource {
    fn prepare(&mut self) -> Result<(), FetchError> {
        self.open(&self.config.base_url)?;
        thread::sleep(self.config.consent_delay());

        let xpath = format!(
            "//button[contains(text(), '{}')]",
            self.config.consent_button_text
        );
        let button = self
            .tab
            .wait_for_xpath_with_custom_timeout(&xpath, CONSENT_TIMEOUT)
            .map_err(|e| FetchError::Precondition(format!("no consent button: {}", e)))?;
        button
            .click()
            .map_err(|e| FetchError::Precondition(format!("consent click failed: {}", e)))?;

        info!("Accepted cookies.");
        Ok(())
    }

    fn fetch(&mut self, request: &PageRequest) -> Result<String, FetchError> {
        let url = self.config.page_url(&request.slug, request.page);
        self.open(&url)?;
        thread::sleep(request.settle);

        self.tab.get_content().map_err(|e| FetchError::Load {
            url,
            message: format!("could not read page content: {}", e),
        })
    }

    fn snapshot(&mut self, label: &str) -> Result<PathBuf, FetchError> {
        let data = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| FetchError::Snapshot(e.to_string()))?;

        std::fs::create_dir_all(&self.config.snapshot_dir)
            .map_err(|e| FetchError::Snapshot(e.to_string()))?;
        let path = snapshot_path(&self.config.snapshot_dir, label, "png");
        std::fs::write(&path, data).map_err(|e| FetchError::Snapshot(e.to_string()))?;
        Ok(path)
    }

    fn source_name(&self) -> &'static str {
        "headless Chrome"
    }
}
