//! Builds a `ProductRecord` from a rendered product page.

use super::models::ProductRecord;
use super::selectors::product;
use crate::error::{HarvestError, ItemOutcome};
use crate::renderer::{Renderer, WaitCondition};
use crate::resolvers::{ImageResolver, NameResolver, PriceResolver, ProductIdResolver, RatingResolver};
use scraper::Html;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, warn};

/// Runs every field resolver against one document snapshot.
#[derive(Default)]
pub struct Extractor {
    name: NameResolver,
    product_id: ProductIdResolver,
    image: ImageResolver,
    price: PriceResolver,
    rating: RatingResolver,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_name_resolver(name: NameResolver) -> Self {
        Self { name, ..Self::default() }
    }

    /// Extracts a record, reporting failures instead of hiding them.
    pub fn try_extract(&self, markup: &str, url: &str) -> Result<ProductRecord, HarvestError> {
        if markup.trim().is_empty() {
            return Err(HarvestError::EmptyDocument { url: url.to_string() });
        }

        catch_unwind(AssertUnwindSafe(|| self.resolve_all(markup, url))).map_err(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "resolver panicked".to_string());
            HarvestError::Extraction { url: url.to_string(), reason }
        })
    }

    /// Extracts a record; any failure yields the placeholder for `url`.
    pub fn extract(&self, markup: &str, url: &str) -> ProductRecord {
        self.try_extract(markup, url).unwrap_or_else(|e| {
            warn!("{}", e);
            ProductRecord::placeholder(url)
        })
    }

    /// Extracts from the page currently shown by the renderer.
    ///
    /// Waits up to `id_timeout` for the article label first; a timeout only
    /// means the id may come back empty.
    pub async fn extract_live<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        url: &str,
        id_timeout: Duration,
    ) -> ItemOutcome {
        let label = WaitCondition::text_contains(product::ID_CONTAINER_CSS, product::ID_LABEL);
        match renderer.wait_for(&label, id_timeout).await {
            Ok(true) => {}
            Ok(false) => debug!("article label did not appear on {}", url),
            Err(e) => debug!("article label wait failed on {}: {:#}", url, e),
        }

        let markup = match renderer.rendered_markup().await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("could not snapshot {}: {:#}", url, e);
                return ItemOutcome::Degraded(ProductRecord::placeholder(url));
            }
        };

        match self.try_extract(&markup, url) {
            Ok(record) => {
                if record.is_placeholder() {
                    debug!("no fields recognized on {}", url);
                }
                ItemOutcome::Extracted(record)
            }
            Err(e) => {
                warn!("{}", e);
                ItemOutcome::Degraded(ProductRecord::placeholder(url))
            }
        }
    }

    fn resolve_all(&self, markup: &str, url: &str) -> ProductRecord {
        let document = Html::parse_document(markup);
        let prices = self.price.resolve(&document);
        let score = self.rating.resolve(&document);

        ProductRecord {
            product_url: url.to_string(),
            image_url: self.image.resolve(&document),
            product_id: self.product_id.resolve(&document),
            product_name: self.name.resolve(&document),
            product_discount_price: prices.discount,
            product_base_price: prices.base,
            product_statistic: score.statistic,
            product_stars: score.stars,
            product_reviews: score.reviews,
        }
    }
}
