//! SPARQL Module
//!
//! Query execution against a SPARQL endpoint, result rows, and the
//! clause builders used to assemble query text.

pub mod builder;
pub mod client;
pub mod queries;
pub mod row;
pub mod value;

pub use builder::{entity_search_service, escape_literal, label_service, values_clause, wd, SelectQuery};
pub use client::WikidataClient;
pub use row::{parse_bindings, ResultRow, Scalar};
pub use value::{entity_url, qid_from_uri, thumb};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failure of a single query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("query failed: HTTP {status}")]
    Http { status: u16 },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("query cancelled")]
    Cancelled,
    #[error("query timed out")]
    TimedOut,
}

impl QueryError {
    /// Cancelled and timed-out queries count neither as success nor failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, QueryError::Cancelled | QueryError::TimedOut)
    }
}

/// Executes a fully formed query
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `query` and return its rows in endpoint order.
    /// Must resolve to `QueryError::Cancelled` once `cancel` fires.
    async fn execute(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ResultRow>, QueryError>;
}
