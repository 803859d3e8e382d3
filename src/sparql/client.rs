//! Wikidata Query Service client
//!
//! Issues `GET` requests against the public SPARQL endpoint and decodes
//! the JSON bindings.

use async_trait::async_trait;
use reqwest::{header, Client};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{parse_bindings, QueryClient, QueryError, ResultRow};
use crate::config::AppConfig;

const SPARQL_JSON: &str = "application/sparql-results+json";

/// HTTP client for a SPARQL endpoint returning JSON results
pub struct WikidataClient {
    client: Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Self {
        Self {
            client: Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.endpoint.clone(), &config.user_agent)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL for a query
    pub fn request_url(&self, query: &str) -> String {
        format!(
            "{}?query={}&format=json",
            self.endpoint,
            urlencoding::encode(query)
        )
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ResultRow>, QueryError> {
        let response = self
            .client
            .get(self.request_url(query))
            .header(header::ACCEPT, SPARQL_JSON)
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("SPARQL endpoint answered HTTP {}", status.as_u16());
            return Err(QueryError::Http { status: status.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;

        let rows = parse_bindings(&body).map_err(|e| QueryError::Decode(e.to_string()))?;
        debug!("SPARQL query returned {} rows", rows.len());
        Ok(rows)
    }
}

impl Default for WikidataClient {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[async_trait]
impl QueryClient for WikidataClient {
    async fn execute(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ResultRow>, QueryError> {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(QueryError::Cancelled),
            result = self.fetch(query) => result,
        }
    }
}
