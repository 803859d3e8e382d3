//! Result Tagger
//!
//! Attaches the originating source to each row without touching its fields.

use serde::{Deserialize, Serialize};

use super::SourceKey;
use crate::sparql::ResultRow;

/// A row together with the query that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRow {
    pub source: SourceKey,
    pub row: ResultRow,
}

/// Tag every row with `source`; order and length are preserved
pub fn tag(rows: Vec<ResultRow>, source: &SourceKey) -> Vec<TaggedRow> {
    rows.into_iter()
        .map(|row| TaggedRow { source: source.clone(), row })
        .collect()
}
