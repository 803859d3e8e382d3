//! Run progress bookkeeping

use serde::{Deserialize, Serialize};

use super::{QueryDescriptor, SourceKey};

/// Settlement state of one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Pending,
    Done { rows: usize },
    Error { message: String },
    Cancelled,
    TimedOut,
}

impl SourceStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SourceStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProgress {
    pub source: SourceKey,
    pub category: Option<String>,
    pub status: SourceStatus,
}

/// Live tally of one aggregation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Cancelled or timed out; neither success nor failure
    pub cancelled: usize,
    /// Rows dropped for lack of an identity
    pub skipped_rows: usize,
    pub sources: Vec<SourceProgress>,
}

impl Progress {
    pub fn new(descriptors: &[QueryDescriptor]) -> Self {
        Self {
            total: descriptors.len(),
            pending: descriptors.len(),
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            skipped_rows: 0,
            sources: descriptors
                .iter()
                .map(|d| SourceProgress {
                    source: d.source.clone(),
                    category: d.category.clone(),
                    status: SourceStatus::Pending,
                })
                .collect(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }

    /// Record the settlement of query `index`. Returns `false` if it had
    /// already settled, in which case nothing changes.
    pub fn record(&mut self, index: usize, status: SourceStatus) -> bool {
        let Some(entry) = self.sources.get_mut(index) else {
            return false;
        };
        if !entry.status.is_pending() || status.is_pending() {
            return false;
        }

        match &status {
            SourceStatus::Done { .. } => self.succeeded += 1,
            SourceStatus::Error { .. } => self.failed += 1,
            SourceStatus::Cancelled | SourceStatus::TimedOut => self.cancelled += 1,
            SourceStatus::Pending => {}
        }
        entry.status = status;
        self.pending -= 1;
        true
    }

    pub fn status_of(&self, source: &SourceKey) -> Option<&SourceStatus> {
        self.sources.iter().find(|s| &s.source == source).map(|s| &s.status)
    }
}
