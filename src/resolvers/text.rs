//! Product name and article number resolvers.

use super::{element_text, has_own_text, non_empty, FallbackChain};
use crate::ozon::selectors::product;
use scraper::Html;

/// Resolves the product heading.
pub struct NameResolver {
    chain: FallbackChain,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::from_chain(FallbackChain::new("product_name").step("heading widget h1", heading_h1))
    }

    /// Uses a caller-built strategy chain.
    pub fn from_chain(chain: FallbackChain) -> Self {
        Self { chain }
    }

    /// Returns the heading text, or an empty string.
    pub fn resolve(&self, document: &Html) -> String {
        self.chain.resolve(document).unwrap_or_default()
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_h1(document: &Html) -> Option<String> {
    let heading = document.select(&product::HEADING).next()?;
    let h1 = heading.select(&product::H1).next()?;
    non_empty(clean_heading(&element_text(h1)))
}

/// Drops tabs and turns line breaks into single spaces.
pub fn clean_heading(text: &str) -> String {
    text.trim().replace('\t', "").replace('\n', " ")
}

/// Resolves the article number from its "Артикул: " label.
pub struct ProductIdResolver {
    label: &'static str,
}

impl ProductIdResolver {
    pub fn new() -> Self {
        Self { label: product::ID_LABEL }
    }

    /// Returns the text after the label, or an empty string.
    pub fn resolve(&self, document: &Html) -> String {
        document
            .select(&product::DIV)
            .find(|div| has_own_text(*div, self.label))
            .and_then(|div| value_after_label(&element_text(div), self.label))
            .unwrap_or_default()
    }
}

impl Default for ProductIdResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Text between the first label occurrence and the next one, trimmed.
fn value_after_label(text: &str, label: &str) -> Option<String> {
    let rest = text.split(label).nth(1)?;
    non_empty(rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_heading() {
        let document = Html::parse_document(
            r#"<div data-widget="webProductHeading"><h1>
                Смартфон Apple iPhone 15
            </h1></div>"#,
        );
        assert_eq!(NameResolver::new().resolve(&document), "Смартфон Apple iPhone 15");
    }

    #[test]
    fn test_name_inner_newlines_and_tabs() {
        let document = Html::parse_document(
            "<div data-widget=\"webProductHeading\"><h1>Чехол\tдля\niPhone 15</h1></div>",
        );
        assert_eq!(NameResolver::new().resolve(&document), "Чехолдля iPhone 15");
    }

    #[test]
    fn test_name_takes_first_h1_in_widget() {
        let document = Html::parse_document(
            r#"<h1>Outside</h1>
               <div data-widget="webProductHeading"><h1>First</h1><h1>Second</h1></div>"#,
        );
        assert_eq!(NameResolver::new().resolve(&document), "First");
    }

    #[test]
    fn test_name_missing() {
        let document = Html::parse_document("<h1>Not in widget</h1>");
        assert_eq!(NameResolver::new().resolve(&document), "");
    }

    #[test]
    fn test_name_from_custom_chain() {
        fn title(document: &Html) -> Option<String> {
            let selector = scraper::Selector::parse("title").ok()?;
            non_empty(element_text(document.select(&selector).next()?))
        }

        let resolver = NameResolver::from_chain(FallbackChain::new("product_name").step("title", title));
        let document = Html::parse_document("<html><head><title>Кружка</title></head></html>");
        assert_eq!(resolver.resolve(&document), "Кружка");
    }

    #[test]
    fn test_clean_heading() {
        assert_eq!(clean_heading("  a\tb\nc  "), "ab c");
        assert_eq!(clean_heading(""), "");
    }

    #[test]
    fn test_product_id() {
        let document = Html::parse_document(
            r#"<div class="ga"><div>Артикул: 1234567890</div><button>copy</button></div>"#,
        );
        assert_eq!(ProductIdResolver::new().resolve(&document), "1234567890");
    }

    #[test]
    fn test_product_id_ignores_ancestors_without_own_label() {
        let document = Html::parse_document(
            r#"<div id="outer">Header <div id="inner">Артикул:  987 </div></div>"#,
        );
        assert_eq!(ProductIdResolver::new().resolve(&document), "987");
    }

    #[test]
    fn test_product_id_missing() {
        let document = Html::parse_document("<div>Код товара 123</div>");
        assert_eq!(ProductIdResolver::new().resolve(&document), "");
    }

    #[test]
    fn test_product_id_label_only() {
        let document = Html::parse_document("<div>Артикул: </div>");
        assert_eq!(ProductIdResolver::new().resolve(&document), "");
    }

    #[test]
    fn test_value_after_label() {
        assert_eq!(value_after_label("Артикул: 42", "Артикул: "), Some("42".to_string()));
        assert_eq!(value_after_label("no label", "Артикул: "), None);
    }
}
