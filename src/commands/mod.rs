//! CLI command implementations.

pub mod harvest;

pub use harvest::{normalize_query, HarvestCommand, HarvestPhase, HarvestReport};
