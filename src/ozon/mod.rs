//! Ozon storefront: page selectors, link discovery and record extraction.

pub mod extractor;
pub mod harvester;
pub mod models;
pub mod selectors;

pub use extractor::Extractor;
pub use harvester::LinkHarvester;
pub use models::{ProductRecord, FIELDS};
