//! Integration tests for extraction and harvesting using fixture files.

use anyhow::{bail, Result};
use async_trait::async_trait;
use ozon_crawler::commands::HarvestCommand;
use ozon_crawler::config::{Config, OutputFormat};
use ozon_crawler::format::Formatter;
use ozon_crawler::ozon::{Extractor, LinkHarvester, ProductRecord, FIELDS};
use ozon_crawler::renderer::{ContextHandle, Renderer, WaitCondition};
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;

const PRODUCT_FIXTURE: &str = include_str!("fixtures/product_page.html");
const SEARCH_FIXTURE: &str = include_str!("fixtures/search_page.html");

const ERGO_URL: &str = "https://www.ozon.ru/product/kreslo-ergo-pro-1432109876/?advert=abc&from=search";
const GAMER_URL: &str = "https://www.ozon.ru/product/kreslo-gamer-x-998877/";
const OFFICE_URL: &str = "https://www.ozon.ru/product/kreslo-office-555/";

/// Serves fixture markup by URL in a single context.
struct FixtureRenderer {
    pages: HashMap<String, String>,
    current: String,
    shut_down: bool,
}

impl FixtureRenderer {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(u, h)| (u.to_string(), h.to_string())).collect(),
            current: String::new(),
            shut_down: false,
        }
    }

    fn markup(&self) -> String {
        self.pages.get(&self.current).cloned().unwrap_or_else(|| "<html></html>".to_string())
    }
}

#[async_trait]
impl Renderer for FixtureRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if url.contains("unreachable") {
            bail!("net::ERR_NAME_NOT_RESOLVED");
        }
        self.current = url.to_string();
        Ok(())
    }

    async fn wait_for(&mut self, condition: &WaitCondition, _timeout: Duration) -> Result<bool> {
        Ok(condition.is_satisfied(&Html::parse_document(&self.markup())))
    }

    async fn rendered_markup(&mut self) -> Result<String> {
        Ok(self.markup())
    }

    async fn run_script(&mut self, _script: &str) -> Result<()> {
        Ok(())
    }

    async fn open_secondary_context(&mut self) -> Result<ContextHandle> {
        bail!("single context only")
    }

    async fn switch_context(&mut self, handle: ContextHandle) -> Result<()> {
        if handle != ContextHandle(0) {
            bail!("no such context: {}", handle);
        }
        Ok(())
    }

    async fn close_context(&mut self, handle: ContextHandle) -> Result<()> {
        bail!("cannot close {}", handle)
    }

    fn active_context(&self) -> ContextHandle {
        ContextHandle(0)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shut_down = true;
        Ok(())
    }
}

fn test_config() -> Config {
    let mut config = Config::new();
    config.wait_timeout_ms = 10;
    config.id_wait_timeout_ms = 10;
    config.reveal_settle_ms = 0;
    config
}

#[test]
fn test_extract_product_fixture() {
    let record = Extractor::new().extract(PRODUCT_FIXTURE, ERGO_URL);

    assert_eq!(record.product_url, ERGO_URL);
    assert_eq!(record.image_url, "https://ir.ozone.ru/s3/multimedia-1-a/wc1000/7000000001.jpg");
    assert_eq!(record.product_id, "1432109876");
    assert_eq!(record.product_name, "Кресло компьютерное Ergo Pro, черное");

    // Card price first, base from the regular block
    assert_eq!(record.product_discount_price, "6 490 ₽");
    assert_eq!(record.product_base_price, "12 500 ₽");

    assert_eq!(record.product_statistic, "4.9 • 1 204 отзыва");
    assert_eq!(record.product_stars, "4.9");
    assert_eq!(record.product_reviews, "1 204 отзыва");
}

#[test]
fn test_extract_unrelated_page() {
    let html = r#"
        <html>
        <body>
            <div class="error-page">Страница не найдена</div>
        </body>
        </html>
    "#;

    let record = Extractor::new().extract(html, GAMER_URL);
    assert_eq!(record, ProductRecord::placeholder(GAMER_URL));
}

#[test]
fn test_collect_links_from_search_fixture() {
    let links = LinkHarvester::new(&test_config()).collect_links(SEARCH_FIXTURE);
    assert_eq!(links, vec![ERGO_URL, GAMER_URL, OFFICE_URL]);
}

#[tokio::test]
async fn test_full_pipeline_with_fixtures() {
    let search_url = "https://www.ozon.ru/search/?text=%D0%BA%D1%80%D0%B5%D1%81%D0%BB%D0%BE&sorting=price";
    let mut renderer = FixtureRenderer::new(&[
        (search_url, SEARCH_FIXTURE),
        (ERGO_URL, PRODUCT_FIXTURE),
    ]);

    let cmd = HarvestCommand::new(test_config());
    let output = cmd.execute_with_renderer(&mut renderer, "  кресло ").await;
    assert!(renderer.shut_down);

    let records: Vec<ProductRecord> = serde_json::from_str(&output).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].product_id, "1432109876");
    assert_eq!(records[1], ProductRecord::placeholder(GAMER_URL));
    assert_eq!(records[2], ProductRecord::placeholder(OFFICE_URL));

    // Output is an array of objects with exactly the nine string keys
    let raw: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&output).unwrap();
    for object in raw {
        assert_eq!(object.len(), FIELDS.len());
        assert!(object.values().all(|v| v.is_string()));
    }
}

#[tokio::test]
async fn test_unreachable_search_is_empty() {
    let mut config = test_config();
    config.base_url = "https://unreachable.example".to_string();
    config.sorting = None;

    let mut renderer = FixtureRenderer::new(&[]);
    let cmd = HarvestCommand::new(config);
    let report = cmd.harvest(&mut renderer, "кресло").await;

    assert!(report.records.is_empty());
    assert_eq!(report.discovered, 0);
}

#[tokio::test]
async fn test_empty_query_outputs_empty_array() {
    let cmd = HarvestCommand::new(test_config());
    assert_eq!(cmd.execute("   ").await.unwrap(), "[]");

    let csv = Formatter::new(OutputFormat::Csv).format_records(&[]);
    assert_eq!(csv, FIELDS.join(","));
}
