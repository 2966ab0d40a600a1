//! ozon-crawler - Product harvester for the Ozon storefront
//!
//! Searches Ozon in a real browser, visits every product on the first results
//! view and extracts a fixed set of fields from each detail page.

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod ozon;
pub mod renderer;
pub mod resolvers;

pub use config::{Config, OutputFormat};
pub use error::{HarvestError, ItemOutcome};
pub use ozon::models::ProductRecord;
