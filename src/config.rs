//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront origin; search and relative tile links are built on it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Search sort order passed as `sorting=`; none keeps the site default
    #[serde(default = "default_sorting")]
    pub sorting: Option<String>,

    /// Bound for the result-tile and product-heading waits
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// Bound for the article-label wait on a product page
    #[serde(default = "default_id_wait_timeout_ms")]
    pub id_wait_timeout_ms: u64,

    /// Bound for a single page navigation
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Pixels scrolled per reveal step on the results page
    #[serde(default = "default_scroll_step_px")]
    pub scroll_step_px: u32,

    /// Milliseconds between reveal steps
    #[serde(default = "default_scroll_interval_ms")]
    pub scroll_interval_ms: u64,

    /// Time given to lazy tiles to materialize after the reveal starts
    #[serde(default = "default_reveal_settle_ms")]
    pub reveal_settle_ms: u64,

    /// Base delay between product pages in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Maximum number of product pages to visit
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chromium executable; auto-detected when unset
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_base_url() -> String {
    "https://www.ozon.ru".to_string()
}

fn default_sorting() -> Option<String> {
    Some("price".to_string())
}

fn default_wait_timeout_ms() -> u64 {
    20_000
}

fn default_id_wait_timeout_ms() -> u64 {
    5_000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_scroll_step_px() -> u32 {
    400
}

fn default_scroll_interval_ms() -> u64 {
    150
}

fn default_reveal_settle_ms() -> u64 {
    2_000
}

fn default_headless() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sorting: default_sorting(),
            wait_timeout_ms: default_wait_timeout_ms(),
            id_wait_timeout_ms: default_id_wait_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            scroll_step_px: default_scroll_step_px(),
            scroll_interval_ms: default_scroll_interval_ms(),
            reveal_settle_ms: default_reveal_settle_ms(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            max_items: None,
            headless: default_headless(),
            chrome_path: None,
            format: OutputFormat::Json,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("ozon-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("OZON_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(path) = std::env::var("OZON_CHROME_PATH") {
            self.chrome_path = Some(PathBuf::from(path));
        }

        if let Ok(delay) = std::env::var("OZON_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(timeout) = std::env::var("OZON_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.wait_timeout_ms = t;
            }
        }

        self
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn id_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.id_wait_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn reveal_settle(&self) -> Duration {
        Duration::from_millis(self.reveal_settle_ms)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
