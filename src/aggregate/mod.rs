//! Federated Query Aggregation
//!
//! Runs several independent queries for one listing, merges their rows by
//! entity identity as each one settles, and exposes a live, filterable
//! view instead of an all-or-nothing result.

pub mod controller;
pub mod filter;
pub mod merger;
pub mod progress;
pub mod slot;
pub mod tagger;

pub use controller::{AggregateError, AggregationState, Aggregator, QueryDescriptor, RunOutcome, RunPlan, Update};
pub use filter::{FilterMode, SourceFilter};
pub use merger::{sort_entities, IdentityForm, MergePolicy, MergeStats, MergedEntity, MergedSet, MissingIdentity, OrderBy};
pub use progress::{Progress, SourceProgress, SourceStatus};
pub use slot::{RunSlot, RunTicket};
pub use tagger::{tag, TaggedRow};

use serde::{Deserialize, Serialize};

/// Identifies the query a row came from, e.g. `"people"` or `"country"`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for SourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
