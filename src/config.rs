use crate::error::ConfigError;
use crate::scrapers::selectors::{Role, SelectorTable};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "CAR_SCOUT_CONFIG";

/// How result pages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Headless Chrome, pages are rendered before extraction
    Browser,
    /// Plain GET of the server-rendered markup
    Http,
}

/// Which price block markup the listings use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Price as the container text, no link or rating
    Simple,
    /// Price heading, ad link and optional price rating
    Rich,
}

/// A brand and its URL slug on the site
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Listing root, category slugs are appended to it
    pub base_url: String,
    pub fetch_mode: FetchMode,
    pub layout: Layout,
    pub user_agent: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Wait after navigating to any page
    pub page_settle_ms: u64,
    /// Extra wait after the first page of a category
    pub first_page_settle_ms: u64,
    /// Randomized wait before looking for the cookie banner
    pub consent_delay_ms: (u64, u64),
    pub consent_button_text: String,
    /// Upper bound for a page to become ready
    pub ready_timeout_ms: u64,
    pub output_dir: PathBuf,
    pub snapshots: bool,
    pub snapshot_dir: PathBuf,
    /// Per-role selector overrides, keyed by role name
    pub selectors: BTreeMap<String, String>,
    pub categories: Vec<Category>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.standvirtual.com/carros/".to_string(),
            fetch_mode: FetchMode::Browser,
            layout: Layout::Rich,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            headless: true,
            window_size: (1920, 1080),
            page_settle_ms: 3000,
            first_page_settle_ms: 5000,
            consent_delay_ms: (3000, 7000),
            consent_button_text: "Aceito".to_string(),
            ready_timeout_ms: 30_000,
            output_dir: PathBuf::from("."),
            snapshots: true,
            snapshot_dir: PathBuf::from("debug"),
            selectors: BTreeMap::new(),
            categories: default_categories(),
        }
    }
}

/// Brands listed on the site, in scraping order.
pub fn default_categories() -> Vec<Category> {
    [
        ("Abarth", "abarth"),
        ("Alfa Romeo", "alfa-romeo"),
        ("Audi", "audi"),
        ("BMW", "bmw"),
        ("Citroën", "citroen"),
        ("Cupra", "cupra"),
        ("Dacia", "dacia"),
        ("DS", "ds"),
        ("Fiat", "fiat"),
        ("Ford", "ford"),
        ("Honda", "honda"),
        ("Hyundai", "hyundai"),
        ("Jaguar", "jaguar"),
        ("Jeep", "jeep"),
        ("Kia", "kia"),
        ("Land Rover", "land-rover"),
        ("Lexus", "lexus"),
        ("Mazda", "mazda"),
        ("Mercedes-Benz", "mercedes-benz"),
        ("MINI", "mini"),
        ("Mitsubishi", "mitsubishi"),
        ("Nissan", "nissan"),
        ("Opel", "opel"),
        ("Peugeot", "peugeot"),
        ("Porsche", "porsche"),
        ("Renault", "renault"),
        ("Seat", "seat"),
        ("Skoda", "skoda"),
        ("Smart", "smart"),
        ("Tesla", "tesla"),
        ("Toyota", "toyota"),
        ("Volkswagen", "vw"),
        ("Volvo", "volvo"),
    ]
    .into_iter()
    .map(|(name, slug)| Category::new(name, slug))
    .collect()
}

impl ScoutConfig {
    /// Config from the file named by `CAR_SCOUT_CONFIG`, or the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| invalid("base_url", format!("{}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("base_url", format!("unsupported scheme {}", url.scheme())));
        }

        if self.categories.is_empty() {
            return Err(invalid("categories", "at least one category is required".to_string()));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() || category.slug.trim().is_empty() {
                return Err(invalid("categories", format!("empty name or slug in {:?}", category)));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(invalid("categories", format!("duplicate category {}", category.name)));
            }
        }

        let (min, max) = self.consent_delay_ms;
        if min > max {
            return Err(invalid("consent_delay_ms", format!("{} is greater than {}", min, max)));
        }
        if self.ready_timeout_ms == 0 {
            return Err(invalid("ready_timeout_ms", "must be positive".to_string()));
        }

        self.selector_table().map(|_| ())
    }

    pub fn selector_table(&self) -> Result<SelectorTable, ConfigError> {
        let mut overrides = BTreeMap::new();
        for (name, selector) in &self.selectors {
            let role = Role::from_name(name)
                .ok_or_else(|| invalid("selectors", format!("unknown role {}", name)))?;
            overrides.insert(role, selector.clone());
        }
        SelectorTable::new(&overrides)
    }

    /// URL of one results page of a category
    pub fn page_url(&self, slug: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.base_url.trim_end_matches('/'), slug, page)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn first_page_settle(&self) -> Duration {
        Duration::from_millis(self.first_page_settle_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Random delay within `consent_delay_ms`
    pub fn consent_delay(&self) -> Duration {
        let (min, max) = self.consent_delay_ms;
        Duration::from_millis(fastrand::u64(min..=max))
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason,
    }
}
