//! Main product image resolver.

use super::{non_empty, FallbackChain};
use crate::ozon::selectors::{image, product};
use regex_lite::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::trace;

/// Width folder in an image path, e.g. `/wc250/`.
static WIDTH_FOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/wc\d+/").unwrap());

/// Resolves the main gallery image URL.
pub struct ImageResolver {
    chain: FallbackChain,
}

impl ImageResolver {
    pub fn new() -> Self {
        let chain = FallbackChain::new("image_url")
            .step("gallery img src", gallery_src)
            .step("gallery img srcset", gallery_srcset)
            .step("timed gallery img", timed_gallery_img)
            .step("og:image", og_image);

        Self { chain }
    }

    /// Returns the normalized image URL, or an empty string.
    pub fn resolve(&self, document: &Html) -> String {
        let Some(mut url) = self.chain.resolve(document) else {
            return String::new();
        };

        if !url.contains(image::HOST) {
            if let Some(hosted) = first_hosted_img(document) {
                trace!("image_url: replacing off-host {} with {}", url, hosted);
                url = hosted;
            }
        }

        normalize_width(&url)
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites every width folder to the preferred width.
pub fn normalize_width(url: &str) -> String {
    WIDTH_FOLDER.replace_all(url, format!("/{}/", image::PREFERRED_WIDTH)).into_owned()
}

/// Picks the preferred-width candidate from a `srcset`, else the last one.
pub fn pick_from_srcset(srcset: &str) -> Option<String> {
    let candidates: Vec<&str> = srcset
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter_map(|c| c.split_whitespace().next())
        .collect();

    candidates
        .iter()
        .find(|c| c.contains(image::PREFERRED_WIDTH))
        .or_else(|| candidates.last())
        .map(|c| c.to_string())
}

fn attr(element: ElementRef, name: &str) -> Option<String> {
    element.value().attr(name).map(str::trim).map(String::from).and_then(non_empty)
}

fn gallery_src(document: &Html) -> Option<String> {
    let gallery = document.select(&product::GALLERY).next()?;
    gallery.select(&product::IMG).find_map(|img| attr(img, "src"))
}

fn gallery_srcset(document: &Html) -> Option<String> {
    let gallery = document.select(&product::GALLERY).next()?;
    gallery
        .select(&product::IMG)
        .find_map(|img| attr(img, "srcset"))
        .and_then(|srcset| pick_from_srcset(&srcset))
}

fn timed_gallery_img(document: &Html) -> Option<String> {
    let img = document.select(&product::GALLERY_TIMED_IMG).next()?;
    attr(img, "src").or_else(|| attr(img, "srcset").and_then(|s| pick_from_srcset(&s)))
}

fn og_image(document: &Html) -> Option<String> {
    let meta = document.select(&product::OG_IMAGE).next()?;
    attr(meta, "content")
}

fn first_hosted_img(document: &Html) -> Option<String> {
    document
        .select(&product::IMG)
        .filter_map(|img| attr(img, "src"))
        .find(|src| src.contains(image::HOST))
}
