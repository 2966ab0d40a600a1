//! Typed outcomes for the harvesting pipeline.
//!
//! A failed item is either dropped (`Err(HarvestError)` from the per-item
//! step) or degraded to a placeholder (`ItemOutcome::Degraded`).

use crate::ozon::models::ProductRecord;
use thiserror::Error;

/// Failures the pipeline contains instead of propagating.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("navigation to {url} failed")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("readiness check on {url} failed")]
    Readiness {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("link discovery failed")]
    Discovery(#[source] anyhow::Error),

    #[error("rendered document for {url} is empty")]
    EmptyDocument { url: String },

    #[error("extraction from {url} failed: {reason}")]
    Extraction { url: String, reason: String },
}

/// Result of extracting one item that was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Resolvers ran against the page.
    Extracted(ProductRecord),
    /// Extraction failed; only the URL survived.
    Degraded(ProductRecord),
}

impl ItemOutcome {
    /// The record to append to the collection.
    pub fn into_record(self) -> ProductRecord {
        match self {
            ItemOutcome::Extracted(record) | ItemOutcome::Degraded(record) => record,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ItemOutcome::Degraded(_))
    }
}
