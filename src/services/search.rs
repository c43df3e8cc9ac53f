//! Debounced candidate search.
//!
//! Every keystroke restarts a fixed quiet period; only the last query is sent to the
//! [`SearchSource`]. A generation counter tags each query so that a response arriving
//! after a newer input, or after the dropdown was dismissed, is dropped.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::{error::ServiceError, state::CandidateMovie};

/// Unfiltered movie lookup; answers are checked only after selection.
pub trait SearchSource: Send + Sync {
    /// Candidates matching `query`, most relevant first.
    fn search(&self, query: &str) -> BoxFuture<'static, Result<Vec<CandidateMovie>, ServiceError>>;
}

/// Message delivered to the input layer once a query settles.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    /// Candidates for the current query; empty for too-short queries.
    Results {
        /// Query as sent.
        query: String,
        /// Candidates in source order.
        candidates: Vec<CandidateMovie>,
    },
    /// Search source failed; the same query may be retried.
    Unavailable {
        /// Query that failed.
        query: String,
        /// Failure description.
        message: String,
    },
}

/// Input-side debouncer in front of a [`SearchSource`].
pub struct SearchDebouncer {
    source: Arc<dyn SearchSource>,
    delay: Duration,
    min_len: usize,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    updates: mpsc::UnboundedSender<SearchUpdate>,
}

impl SearchDebouncer {
    /// Build a debouncer and the receiver its updates are delivered on.
    pub fn new(
        source: Arc<dyn SearchSource>,
        delay: Duration,
        min_len: usize,
    ) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            source,
            delay,
            min_len,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            updates,
        };
        (debouncer, receiver)
    }

    /// Feed the current input text, restarting the quiet period.
    pub fn input(&mut self, text: &str) {
        let generation = self.bump();
        let query = text.trim().to_owned();
        let source = self.source.clone();
        let current = self.generation.clone();
        let updates = self.updates.clone();
        let delay = self.delay;
        let too_short = query.chars().count() < self.min_len;

        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            if too_short {
                let _ = updates.send(SearchUpdate::Results {
                    query,
                    candidates: Vec::new(),
                });
                return;
            }

            let result = source.search(&query).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(%query, "dropping stale search response");
                return;
            }

            let update = match result {
                Ok(candidates) => {
                    debug!(%query, count = candidates.len(), "search settled");
                    SearchUpdate::Results { query, candidates }
                }
                Err(err) => {
                    warn!(%query, error = %err, "search source failed");
                    SearchUpdate::Unavailable {
                        query,
                        message: err.to_string(),
                    }
                }
            };
            let _ = updates.send(update);
        }));
    }

    /// Close the dropdown: any pending or in-flight query is forgotten.
    pub fn dismiss(&mut self) {
        self.bump();
    }

    fn bump(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
