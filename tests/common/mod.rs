//! Shared test fixtures: a scripted in-memory query client

#![allow(dead_code)]

use async_trait::async_trait;
use queer_memory::sparql::{QueryClient, QueryError, ResultRow};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

struct Script {
    reply: Result<Vec<ResultRow>, QueryError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Answers each query text once with a scripted reply. Gated replies wait
/// for their release signal (or cancellation) before answering; unknown
/// queries fail with HTTP 404.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, Script>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, query: &str, reply: Result<Vec<ResultRow>, QueryError>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(query.to_string(), Script { reply, gate: None });
    }

    /// Reply once the returned sender fires or is dropped
    pub fn gated(&self, query: &str, reply: Result<Vec<ResultRow>, QueryError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.scripts.lock().unwrap().insert(
            query.to_string(),
            Script {
                reply,
                gate: Some(rx),
            },
        );
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for ScriptedClient {
    async fn execute(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ResultRow>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().remove(query);
        let Some(script) = script else {
            return Err(QueryError::Http { status: 404 });
        };
        if let Some(gate) = script.gate {
            tokio::select! {
                _ = cancel.cancelled() => return Err(QueryError::Cancelled),
                _ = gate => {}
            }
        }
        script.reply
    }
}

pub fn item(qid: &str, label: &str) -> ResultRow {
    ResultRow::new()
        .with("item", format!("http://www.wikidata.org/entity/{}", qid))
        .with("itemLabel", label)
}
