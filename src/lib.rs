//! Queer Memory
//!
//! Progressive federated querying of Wikidata for the Queer Memory listings:
//! - SPARQL query construction and a cancellable endpoint client
//! - Concurrent multi-source aggregation with per-source progress
//! - Identity-keyed merging with fill-in-blanks and additive counts
//! - Source filtering, translation and listing view models

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod i18n;
pub mod listings;
pub mod prefs;
pub mod render;
pub mod session;
pub mod sparql;
pub mod utils;

// Re-exports for convenience
pub use aggregate::{Aggregator, RunOutcome, RunPlan, SourceFilter};
pub use config::AppConfig;
pub use sparql::{QueryClient, QueryError, ResultRow, WikidataClient};
