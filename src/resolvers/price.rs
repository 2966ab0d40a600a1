//! Price resolver.
//!
//! Ozon shows prices in several layouts: a card-holder price block with its
//! own label, a "without card" block holding the current and crossed-out
//! prices, and a plain price widget. Tiers run in that order and each only
//! fills values the previous tiers left empty.

use super::{element_text, has_own_text, parent_element};
use crate::ozon::selectors::product;
use scraper::{ElementRef, Html};
use tracing::trace;

/// Discount and base price as displayed, e.g. "1 234 ₽".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prices {
    pub discount: String,
    pub base: String,
}

impl Prices {
    /// Returns true once both prices are set.
    pub fn is_complete(&self) -> bool {
        !self.discount.is_empty() && !self.base.is_empty()
    }

    fn fill_discount(&mut self, value: &str) {
        if self.discount.is_empty() {
            self.discount = value.to_string();
        }
    }

    fn fill_base(&mut self, value: &str) {
        if self.base.is_empty() {
            self.base = value.to_string();
        }
    }
}

/// One layout-specific way of reading prices.
pub trait PriceTier: Send + Sync {
    /// Fills whatever missing prices this layout provides.
    fn fill(&self, document: &Html, prices: &mut Prices);

    fn description(&self) -> &str;
}

/// Price shown next to the "с Ozon Картой" label.
pub struct CardPriceTier;

impl PriceTier for CardPriceTier {
    fn fill(&self, document: &Html, prices: &mut Prices) {
        let Some(label) = find_label(document, &product::CARD_PRICE_LABELS) else {
            return;
        };

        let value = parent_element(label)
            .and_then(|block| block.select(&product::DIV).next())
            .and_then(|container| container.select(&product::SPAN).next())
            .map(element_text)
            .unwrap_or_default();

        prices.fill_discount(&value);
    }

    fn description(&self) -> &str {
        "card price"
    }
}

/// Current and crossed-out prices in the "без Ozon Карты" block.
pub struct NoCardPriceTier;

impl PriceTier for NoCardPriceTier {
    fn fill(&self, document: &Html, prices: &mut Prices) {
        let Some(label) = find_label(document, &[product::NO_CARD_PRICE_LABEL]) else {
            return;
        };

        let values: Vec<String> = parent_element(label)
            .and_then(parent_element)
            .and_then(|block| block.select(&product::DIV).next())
            .map(|container| container.select(&product::SPAN).map(element_text).collect())
            .unwrap_or_default();

        let Some(first) = values.first() else {
            return;
        };
        let second = values.get(1).filter(|v| !v.is_empty()).unwrap_or(first);

        prices.fill_discount(first);
        prices.fill_base(second);
    }

    fn description(&self) -> &str {
        "no-card price"
    }
}

/// Generic price widget, read positionally.
pub struct WidgetPriceTier;

impl PriceTier for WidgetPriceTier {
    fn fill(&self, document: &Html, prices: &mut Prices) {
        let Some(widget) = document.select(&product::PRICE).next() else {
            return;
        };

        let values: Vec<String> = widget
            .select(&product::SPAN)
            .map(element_text)
            .filter(|v| !v.is_empty())
            .collect();

        if let Some(first) = values.first() {
            prices.fill_discount(first);
        }
        if let Some(second) = values.get(1) {
            prices.fill_base(second);
        }
    }

    fn description(&self) -> &str {
        "price widget"
    }
}

/// Runs the price tiers until both prices are known.
pub struct PriceResolver {
    tiers: Vec<Box<dyn PriceTier>>,
}

impl PriceResolver {
    pub fn new() -> Self {
        Self { tiers: vec![Box::new(CardPriceTier), Box::new(NoCardPriceTier), Box::new(WidgetPriceTier)] }
    }

    pub fn resolve(&self, document: &Html) -> Prices {
        let mut prices = Prices::default();

        for tier in &self.tiers {
            if prices.is_complete() {
                break;
            }
            tier.fill(document, &mut prices);
            trace!("prices after '{}': {:?}", tier.description(), prices);
        }

        prices
    }
}

impl Default for PriceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// First `span` whose own text contains one of the labels.
fn find_label<'a>(document: &'a Html, labels: &[&str]) -> Option<ElementRef<'a>> {
    document
        .select(&product::SPAN)
        .find(|span| labels.iter().any(|label| has_own_text(*span, label)))
}
