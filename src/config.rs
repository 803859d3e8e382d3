//! Application configuration
//!
//! Defaults suit the public Wikidata Query Service. Every field can be
//! overridden from the environment (a `.env` file is honoured).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ──────────────────────────────────────────────────────────────────────────────
// CONFIGURATION
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SPARQL endpoint URL
    pub endpoint: String,
    /// Sent with every request, as the Wikidata usage policy asks
    pub user_agent: String,
    /// Per-query limit; an expired query settles as timed out
    pub query_timeout: Duration,
    /// Explicit language, highest priority when resolving the UI language
    pub lang: Option<String>,
    /// Theme and language preferences
    pub prefs_path: PathBuf,
    /// Replacement vocabulary (JSON), built-in values otherwise
    pub vocabulary_path: Option<PathBuf>,
    /// Replacement dictionary (JSON), built-in strings otherwise
    pub dictionary_path: Option<PathBuf>,
    /// Row cap applied to every search query, overriding the per-category defaults
    pub search_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: format!("queer_memory/{} (Wikidata listings client)", env!("CARGO_PKG_VERSION")),
            query_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            lang: None,
            prefs_path: PathBuf::from("queer_memory_prefs.json"),
            vocabulary_path: None,
            dictionary_path: None,
            search_limit: None,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read `QM_*` variables
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = get("QM_SPARQL_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(agent) = get("QM_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = get("QM_QUERY_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("QM_QUERY_TIMEOUT_SECS must be a whole number of seconds, got '{}'", secs))?;
            config.query_timeout = Duration::from_secs(secs);
        }
        config.lang = get("QM_LANG");
        if let Some(path) = get("QM_PREFS_PATH") {
            config.prefs_path = PathBuf::from(path);
        }
        config.vocabulary_path = get("QM_VOCABULARY_PATH").map(PathBuf::from);
        config.dictionary_path = get("QM_DICTIONARY_PATH").map(PathBuf::from);
        if let Some(limit) = get("QM_SEARCH_LIMIT") {
            let limit: usize = limit
                .parse()
                .with_context(|| format!("QM_SEARCH_LIMIT must be a positive integer, got '{}'", limit))?;
            config.search_limit = Some(limit);
        }

        Ok(config)
    }
}
