//! Harvest command: search, discover links, extract each product.

use crate::config::Config;
use crate::error::{HarvestError, ItemOutcome};
use crate::format::Formatter;
use crate::ozon::models::ProductRecord;
use crate::ozon::selectors::product;
use crate::ozon::{Extractor, LinkHarvester};
use crate::renderer::{ChromiumRenderer, ContextHandle, Renderer, WaitCondition};
use anyhow::{Context, Result};
use rand::RngExt;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of one harvest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestPhase {
    Idle,
    SearchRequested,
    LinksDiscovered,
    Extracting,
    Finalized,
}

impl fmt::Display for HarvestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarvestPhase::Idle => "idle",
            HarvestPhase::SearchRequested => "search requested",
            HarvestPhase::LinksDiscovered => "links discovered",
            HarvestPhase::Extracting => "extracting",
            HarvestPhase::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// What a harvest run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Records in discovery order
    pub records: Vec<ProductRecord>,
    /// Links found on the search page (after `max_items`)
    pub discovered: usize,
    /// Items skipped because their page could not be reached
    pub dropped: usize,
    /// Items emitted as placeholders
    pub degraded: usize,
    pub phase: HarvestPhase,
}

impl HarvestReport {
    fn new() -> Self {
        Self { records: Vec::new(), discovered: 0, dropped: 0, degraded: 0, phase: HarvestPhase::Idle }
    }

    fn advance(&mut self, next: HarvestPhase) {
        debug!("Harvest phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Executes a product harvest for one query.
pub struct HarvestCommand {
    config: Config,
    extractor: Extractor,
    harvester: LinkHarvester,
}

impl HarvestCommand {
    /// Creates a new harvest command.
    pub fn new(config: Config) -> Self {
        let harvester = LinkHarvester::new(&config);
        Self { config, extractor: Extractor::new(), harvester }
    }

    /// Runs the harvest in a fresh browser and returns formatted output.
    ///
    /// An empty query returns the empty collection without launching a browser.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let query = normalize_query(query);
        if query.is_empty() {
            info!("Empty query, nothing to harvest");
            return Ok(self.formatter().format_records(&[]));
        }

        let mut renderer =
            ChromiumRenderer::launch(&self.config).await.context("Failed to start browser")?;

        Ok(self.execute_with_renderer(&mut renderer, &query).await)
    }

    /// Runs the harvest with a provided renderer and shuts it down afterwards.
    pub async fn execute_with_renderer<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        query: &str,
    ) -> String {
        let report = self.harvest(renderer, query).await;

        if let Err(e) = renderer.shutdown().await {
            warn!("Browser shutdown failed: {:#}", e);
        }

        self.formatter().format_records(&report.records)
    }

    /// Drives the renderer through search, discovery and extraction.
    ///
    /// Never fails: every error is contained and reflected in the report.
    pub async fn harvest<R: Renderer + ?Sized>(&self, renderer: &mut R, query: &str) -> HarvestReport {
        let mut report = HarvestReport::new();
        let query = normalize_query(query);

        if query.is_empty() {
            report.advance(HarvestPhase::Finalized);
            return report;
        }

        info!("Harvesting products for: {}", query);
        let search_context = renderer.active_context();

        report.advance(HarvestPhase::SearchRequested);
        let search_url = self.search_url(&query);
        if let Err(e) = renderer.navigate(&search_url).await {
            let err = HarvestError::Navigation { url: search_url, source: e };
            warn!("{:#}", anyhow::Error::from(err));
            report.advance(HarvestPhase::Finalized);
            return report;
        }

        let mut links = match self.harvester.harvest(renderer).await {
            Ok(links) => links,
            Err(e) => {
                warn!("{:#}", anyhow::Error::from(e));
                report.advance(HarvestPhase::Finalized);
                return report;
            }
        };
        if let Some(max) = self.config.max_items {
            links.truncate(max);
        }
        report.discovered = links.len();
        report.advance(HarvestPhase::LinksDiscovered);

        if links.is_empty() {
            report.advance(HarvestPhase::Finalized);
            return report;
        }

        let detail_context = match renderer.open_secondary_context().await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Could not open a detail context, reusing the search context: {:#}", e);
                search_context
            }
        };

        report.advance(HarvestPhase::Extracting);
        for (i, url) in links.iter().enumerate() {
            if i > 0 {
                self.delay().await;
            }
            debug!("Item {}/{}: {}", i + 1, links.len(), url);

            match self.harvest_item(renderer, detail_context, url).await {
                Ok(outcome) => {
                    if outcome.is_degraded() {
                        report.degraded += 1;
                    }
                    report.records.push(outcome.into_record());
                }
                Err(e) => {
                    warn!("Dropping item: {:#}", anyhow::Error::from(e));
                    report.dropped += 1;
                }
            }
        }

        if detail_context != search_context {
            if let Err(e) = renderer.close_context(detail_context).await {
                debug!("Failed to close {}: {:#}", detail_context, e);
            }
        }
        if let Err(e) = renderer.switch_context(search_context).await {
            debug!("Failed to return to {}: {:#}", search_context, e);
        }
        report.advance(HarvestPhase::Finalized);

        info!(
            "Harvested {} of {} products ({} dropped, {} degraded)",
            report.records.len(),
            report.discovered,
            report.dropped,
            report.degraded
        );
        report
    }

    /// Visits one detail page. An error means the item is dropped.
    async fn harvest_item<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        context: ContextHandle,
        url: &str,
    ) -> Result<ItemOutcome, HarvestError> {
        let navigation_error = |source| HarvestError::Navigation { url: url.to_string(), source };

        renderer.switch_context(context).await.map_err(navigation_error)?;
        renderer.navigate(url).await.map_err(navigation_error)?;

        let heading = WaitCondition::present(product::HEADING_READY_CSS);
        let ready = renderer
            .wait_for(&heading, self.config.wait_timeout())
            .await
            .map_err(|source| HarvestError::Readiness { url: url.to_string(), source })?;
        if !ready {
            debug!("Heading did not appear on {}, extracting anyway", url);
        }

        Ok(self.extractor.extract_live(renderer, url, self.config.id_wait_timeout()).await)
    }

    /// Builds the search results URL for a normalized query.
    pub fn search_url(&self, query: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = format!("{}/search/?text={}", base, urlencoding::encode(query));
        if let Some(sorting) = self.config.sorting.as_deref().filter(|s| !s.is_empty()) {
            url.push_str("&sorting=");
            url.push_str(&urlencoding::encode(sorting));
        }
        url
    }

    fn formatter(&self) -> Formatter {
        Formatter::new(self.config.format)
    }

    /// Politeness delay between detail pages.
    async fn delay(&self) {
        if self.config.delay_ms == 0 && self.config.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.config.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.config.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.config.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

/// Trims the query and collapses inner whitespace runs to single spaces.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
