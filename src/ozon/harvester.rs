//! Discovers product detail links on a rendered search results page.

use super::selectors::search;
use crate::config::Config;
use crate::error::HarvestError;
use crate::renderer::{Renderer, WaitCondition};
use scraper::Html;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Collects result-tile links, revealing lazily loaded tiles first.
#[derive(Debug, Clone)]
pub struct LinkHarvester {
    base_url: String,
    wait_timeout: Duration,
    reveal_settle: Duration,
    scroll_step_px: u32,
    scroll_interval_ms: u64,
}

impl LinkHarvester {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            wait_timeout: config.wait_timeout(),
            reveal_settle: config.reveal_settle(),
            scroll_step_px: config.scroll_step_px,
            scroll_interval_ms: config.scroll_interval_ms,
        }
    }

    /// Returns the distinct detail URLs on the page the renderer shows.
    ///
    /// A page without tiles is a normal empty result, not an error.
    pub async fn harvest<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
    ) -> Result<Vec<String>, HarvestError> {
        let tiles = WaitCondition::present(search::TILE_CSS);

        let found = renderer
            .wait_for(&tiles, self.wait_timeout)
            .await
            .map_err(HarvestError::Discovery)?;
        if !found {
            info!("No result tiles appeared");
            return Ok(Vec::new());
        }

        if let Err(e) = renderer.run_script(&self.reveal_script()).await {
            debug!("reveal script failed: {:#}", e);
        }
        tokio::time::sleep(self.reveal_settle).await;

        renderer
            .wait_for(&tiles, self.wait_timeout)
            .await
            .map_err(HarvestError::Discovery)?;

        let markup = renderer.rendered_markup().await.map_err(HarvestError::Discovery)?;
        let links = self.collect_links(&markup);
        info!("Discovered {} product links", links.len());
        Ok(links)
    }

    /// Extracts distinct tile links from search markup, in page order.
    pub fn collect_links(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);
        let mut seen = HashSet::new();

        document
            .select(&search::TILE)
            .filter_map(|tile| tile.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(|href| self.absolute_url(href))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if let Some(rest) = href.strip_prefix("//") {
            format!("https://{}", rest)
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }

    /// Scrolls the page step by step to the bottom so lazy tiles load.
    pub fn reveal_script(&self) -> String {
        format!(
            r#"(() => {{
    const scrollStep = {step};
    const scrollInterval = {interval};
    const scrollHeight = document.documentElement.scrollHeight;
    let currentPosition = 0;
    const timer = setInterval(() => {{
        window.scrollBy(0, scrollStep);
        currentPosition += scrollStep;
        if (currentPosition >= scrollHeight) {{
            clearInterval(timer);
        }}
    }}, scrollInterval);
}})()"#,
            step = self.scroll_step_px,
            interval = self.scroll_interval_ms,
        )
    }
}
