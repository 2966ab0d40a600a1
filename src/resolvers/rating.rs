//! Rating widget resolver.

use super::element_text;
use crate::ozon::selectors::product;
use scraper::Html;

/// Composite score and its two components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Display string, e.g. "4.8 • 120 отзывов"
    pub statistic: String,
    /// Stars part, e.g. "4.8"
    pub stars: String,
    /// Reviews part, e.g. "120 отзывов"
    pub reviews: String,
}

impl Score {
    /// Splits a composite score text on the known separator.
    ///
    /// Text without the separator is kept whole as the composite.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once(product::SCORE_SEPARATOR) {
            Some((stars, reviews)) => {
                let stars = stars.trim().to_string();
                let reviews = reviews.trim().to_string();
                Self {
                    statistic: format!("{}{}{}", stars, product::SCORE_SEPARATOR, reviews),
                    stars,
                    reviews,
                }
            }
            None => Self { statistic: text.to_string(), ..Self::default() },
        }
    }
}

/// Resolves the single-product score widget.
pub struct RatingResolver;

impl RatingResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, document: &Html) -> Score {
        document
            .select(&product::SCORE)
            .next()
            .map(|widget| Score::parse(&element_text(widget)))
            .unwrap_or_default()
    }
}

impl Default for RatingResolver {
    fn default() -> Self {
        Self::new()
    }
}
