//! Progressive Aggregation Controller
//!
//! Dispatches every query of a run at once, folds each result into the
//! merged set as it settles and hands the caller a fresh, filtered view
//! after every settlement. Query failures become per-source statuses; the
//! run only fails as a whole when nothing succeeded.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{tag, MergePolicy, MergedEntity, MergedSet, OrderBy, Progress, SourceFilter, SourceKey, SourceStatus};
use crate::sparql::{QueryClient, QueryError, ResultRow};

/// One query of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub source: SourceKey,
    pub query: String,
    /// Display category, e.g. a translation key
    pub category: Option<String>,
}

impl QueryDescriptor {
    pub fn new(source: impl Into<SourceKey>, query: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            query: query.into(),
            category: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Everything a run needs besides the client
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub descriptors: Vec<QueryDescriptor>,
    pub policy: MergePolicy,
    pub order: OrderBy,
    pub filter: SourceFilter,
}

impl RunPlan {
    /// Insertion order, all sources enabled
    pub fn new(descriptors: Vec<QueryDescriptor>, policy: MergePolicy) -> Self {
        let filter = SourceFilter::new(descriptors.iter().map(|d| d.source.clone()));
        Self {
            descriptors,
            policy,
            order: OrderBy::Insertion,
            filter,
        }
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    pub fn filter(mut self, filter: SourceFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// State of one run, owned by the controller until the run settles
#[derive(Debug, Clone)]
pub struct AggregationState {
    pub progress: Progress,
    pub merged: MergedSet,
    pub filter: SourceFilter,
    pub order: OrderBy,
    pub errors: Vec<(SourceKey, QueryError)>,
}

impl AggregationState {
    pub fn new(plan: &RunPlan) -> Self {
        Self {
            progress: Progress::new(&plan.descriptors),
            merged: MergedSet::new(plan.policy.clone()),
            filter: plan.filter.clone(),
            order: plan.order.clone(),
            errors: Vec::new(),
        }
    }

    /// Sorted, filtered entities
    pub fn view(&self) -> Vec<&MergedEntity> {
        self.filter.apply(&self.merged.sorted(&self.order))
    }

    /// Fold the result of query `index` into the state
    pub fn settle(&mut self, index: usize, result: Result<Vec<ResultRow>, QueryError>) {
        let Some(source) = self.progress.sources.get(index).map(|s| s.source.clone()) else {
            return;
        };
        if !self.progress.sources[index].status.is_pending() {
            return;
        }

        let status = match result {
            Ok(rows) => {
                let count = rows.len();
                let stats = self.merged.merge(tag(rows, &source));
                self.progress.skipped_rows += stats.skipped;
                debug!(
                    "Source '{}' settled: {} rows ({} new, {} merged, {} skipped)",
                    source, count, stats.inserted, stats.updated, stats.skipped
                );
                SourceStatus::Done { rows: count }
            }
            Err(QueryError::Cancelled) => SourceStatus::Cancelled,
            Err(QueryError::TimedOut) => {
                warn!("Source '{}' timed out", source);
                self.errors.push((source, QueryError::TimedOut));
                SourceStatus::TimedOut
            }
            Err(e) => {
                warn!("Source '{}' failed: {}", source, e);
                let message = e.to_string();
                self.errors.push((source, e));
                SourceStatus::Error { message }
            }
        };
        self.progress.record(index, status);
    }
}

/// What the render callback receives after each settlement
#[derive(Debug)]
pub struct Update<'a> {
    pub entities: Vec<&'a MergedEntity>,
    pub progress: &'a Progress,
}

/// How a run ended, short of total failure
#[derive(Debug)]
pub enum RunOutcome {
    /// Every query settled and at least one succeeded (possibly with zero rows)
    Completed(AggregationState),
    /// The run token fired; `settled` queries had been folded in by then
    Cancelled { settled: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("all {} sources failed", .failures.len())]
    AllSourcesFailed { failures: Vec<(SourceKey, QueryError)> },
}

/// Runs query plans against a client
pub struct Aggregator {
    client: Arc<dyn QueryClient>,
    timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client, timeout: None }
    }

    /// Per-query time limit; an expired query settles as timed out
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Execute `plan`, calling `on_update` after every individual
    /// settlement until the run settles or `cancel` fires.
    pub async fn run<F>(
        &self,
        plan: RunPlan,
        cancel: CancellationToken,
        mut on_update: F,
    ) -> Result<RunOutcome, AggregateError>
    where
        F: FnMut(Update<'_>),
    {
        let mut state = AggregationState::new(&plan);
        if plan.descriptors.is_empty() {
            return Ok(RunOutcome::Completed(state));
        }

        let mut in_flight = FuturesUnordered::new();
        for (index, descriptor) in plan.descriptors.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            let token = cancel.child_token();
            let timeout = self.timeout;
            debug!("Dispatching query for source '{}'", descriptor.source);

            in_flight.push(async move {
                let query = descriptor.query;
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, client.execute(&query, &token)).await {
                        Ok(result) => result,
                        Err(_) => {
                            token.cancel();
                            Err(QueryError::TimedOut)
                        }
                    },
                    None => client.execute(&query, &token).await,
                };
                (index, result)
            });
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let settled = state.progress.total - state.progress.pending;
                    info!("Aggregation cancelled after {} of {} sources", settled, state.progress.total);
                    return Ok(RunOutcome::Cancelled { settled });
                }
                next = in_flight.next() => {
                    let Some((index, result)) = next else { break };
                    state.settle(index, result);
                    on_update(Update {
                        entities: state.view(),
                        progress: &state.progress,
                    });
                    if state.progress.is_settled() {
                        break;
                    }
                }
            }
        }

        let progress = &state.progress;
        info!(
            "Aggregation settled: {} ok, {} failed, {} cancelled, {} entities",
            progress.succeeded,
            progress.failed,
            progress.cancelled,
            state.merged.len()
        );

        if progress.succeeded == 0 {
            return Err(AggregateError::AllSourcesFailed { failures: state.errors });
        }
        Ok(RunOutcome::Completed(state))
    }
}
