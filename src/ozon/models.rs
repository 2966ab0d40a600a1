//! Data model for harvested product records.

use serde::{Deserialize, Serialize};

/// Field names in serialization order.
pub const FIELDS: [&str; 9] = [
    "product_url",
    "image_url",
    "product_id",
    "product_name",
    "product_discount_price",
    "product_base_price",
    "product_statistic",
    "product_stars",
    "product_reviews",
];

/// One product as extracted from its detail page.
///
/// Every field is a string; an empty string means "not found". The field
/// order here is the serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    /// Detail page URL the record was extracted from
    pub product_url: String,
    /// Main gallery image
    pub image_url: String,
    /// Article number ("Артикул")
    pub product_id: String,
    /// Product heading
    pub product_name: String,
    /// Card/member price, raw display text
    pub product_discount_price: String,
    /// Regular price, raw display text
    pub product_base_price: String,
    /// Composite rating text, e.g. "4.8 • 120 отзывов"
    pub product_statistic: String,
    /// Stars part of the composite
    pub product_stars: String,
    /// Reviews part of the composite
    pub product_reviews: String,
}

impl ProductRecord {
    /// Creates a record with only the URL set.
    pub fn placeholder(url: impl Into<String>) -> Self {
        Self { product_url: url.into(), ..Self::default() }
    }

    /// Returns true if nothing but the URL was extracted.
    pub fn is_placeholder(&self) -> bool {
        self.values().iter().skip(1).all(|v| v.is_empty())
    }

    /// Field values in serialization order.
    pub fn values(&self) -> [&str; 9] {
        [
            &self.product_url,
            &self.image_url,
            &self.product_id,
            &self.product_name,
            &self.product_discount_price,
            &self.product_base_price,
            &self.product_statistic,
            &self.product_stars,
            &self.product_reviews,
        ]
    }
}
