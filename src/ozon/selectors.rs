//! CSS selectors and text markers for Ozon pages.
//!
//! Ozon renders most of the product page client-side as "widgets" tagged with
//! `data-widget`. Update this file when the markup changes, and add a fixture
//! to `tests/fixtures/` for the new layout.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the search results page.
pub mod search {
    use super::*;

    /// Clickable product tile; its `href` is the detail page.
    pub const TILE_CSS: &str = ".tile-clickable-element";

    pub static TILE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(TILE_CSS).unwrap());
}

/// Selectors and markers for a product detail page.
pub mod product {
    use super::*;

    /// Readiness marker: the heading has been rendered.
    pub const HEADING_READY_CSS: &str = "div[data-widget*='webProductHeading'] h1";

    /// Container whose text carries the article label.
    pub const ID_CONTAINER_CSS: &str = "div";

    /// Article number label. The value follows it.
    pub const ID_LABEL: &str = "Артикул: ";

    /// Heading widget.
    pub static HEADING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-widget='webProductHeading']").unwrap());

    pub static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

    pub static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

    pub static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

    /// Main image gallery widget.
    pub static GALLERY: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-widget='webGallery']").unwrap());

    pub static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

    /// Gallery image carrying a timing/LCP name outside the gallery widget.
    pub static GALLERY_TIMED_IMG: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "img[elementtiming*='webGallery'], \
             img[data-lcp-name*='webGallery']",
        )
        .unwrap()
    });

    /// Social preview image.
    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:image']").unwrap());

    /// Composite rating widget ("4.8 • 120 отзывов").
    pub static SCORE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-widget='webSingleProductScore']").unwrap());

    /// Generic price widget.
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-widget='webPrice']").unwrap());

    /// Label of the card-holder price. Both Latin and Cyrillic "c" occur.
    pub const CARD_PRICE_LABELS: [&str; 2] = ["с Ozon Картой", "c Ozon Картой"];

    /// Label of the regular (no card) price block.
    pub const NO_CARD_PRICE_LABEL: &str = "без Ozon Карты";

    /// Separator between stars and reviews in the score widget.
    pub const SCORE_SEPARATOR: &str = " • ";
}

/// Image host markers.
pub mod image {
    /// Host serving product images.
    pub const HOST: &str = "ir.ozone.ru";

    /// Preferred width folder.
    pub const PREFERRED_WIDTH: &str = "wc1000";
}
