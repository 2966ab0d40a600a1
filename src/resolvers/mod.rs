//! Field resolvers: pure functions over a rendered product page.
//!
//! Each resolver extracts one semantic field and falls back through an
//! ordered list of strategies. Resolvers never fail; a miss is an empty
//! string.

pub mod image;
pub mod price;
pub mod rating;
pub mod text;

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

pub use image::ImageResolver;
pub use price::{PriceResolver, Prices};
pub use rating::{RatingResolver, Score};
pub use text::{NameResolver, ProductIdResolver};

/// One way of finding a field value.
pub trait Strategy: Send + Sync {
    /// Returns the value if this strategy finds a non-empty one.
    fn resolve(&self, document: &Html) -> Option<String>;

    /// Short name used in trace logs.
    fn description(&self) -> &str;
}

/// A strategy backed by a plain function.
pub struct FnStrategy {
    name: &'static str,
    func: fn(&Html) -> Option<String>,
}

impl FnStrategy {
    pub fn new(name: &'static str, func: fn(&Html) -> Option<String>) -> Self {
        Self { name, func }
    }
}

impl Strategy for FnStrategy {
    fn resolve(&self, document: &Html) -> Option<String> {
        (self.func)(document)
    }

    fn description(&self) -> &str {
        self.name
    }
}

/// Ordered strategies; the first non-empty result wins.
pub struct FallbackChain {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy>>,
}

impl FallbackChain {
    /// Creates an empty chain for the named field.
    pub fn new(field: &'static str) -> Self {
        Self { field, strategies: Vec::new() }
    }

    /// Appends a function strategy.
    pub fn step(mut self, name: &'static str, func: fn(&Html) -> Option<String>) -> Self {
        self.strategies.push(Box::new(FnStrategy::new(name, func)));
        self
    }

    /// Runs the strategies in order and returns the first non-empty value.
    pub fn resolve(&self, document: &Html) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.resolve(document) {
                Some(value) if !value.is_empty() => {
                    trace!("{}: resolved by '{}'", self.field, strategy.description());
                    return Some(value);
                }
                _ => trace!("{}: '{}' found nothing", self.field, strategy.description()),
            }
        }
        debug!("{}: no match after [{}]", self.field, self.descriptions().join(", "));
        None
    }

    /// Strategy names in order.
    pub fn descriptions(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.description()).collect()
    }
}

/// Full text of an element, trimmed.
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parent of an element, if it is an element.
pub(crate) fn parent_element(element: ElementRef) -> Option<ElementRef> {
    element.parent().and_then(ElementRef::wrap)
}

/// True if one of the element's direct text nodes contains `needle`.
pub(crate) fn has_own_text(element: ElementRef, needle: &str) -> bool {
    element.children().filter_map(|child| child.value().as_text()).any(|t| t.contains(needle))
}

/// Returns the value if it is non-empty.
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
