//! Query store: one entry per query key with deduplicated, retried fetches.
//!
//! Fetches run as spawned tasks and are shared between every caller that
//! asks for the same key while the request is in flight. Nothing cancels a
//! fetch; when it settles the entry is updated even if no observer remains.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use metrics::{counter, histogram};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::api::RequestFailure;

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::mutex_lock;
use super::phase::{QueryPhase, QuerySnapshot};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_QUERY_FETCH_TOTAL: &str = "blogspace_query_fetch_total";
pub(crate) const METRIC_QUERY_RETRY_TOTAL: &str = "blogspace_query_retry_total";
pub(crate) const METRIC_QUERY_DEDUP_TOTAL: &str = "blogspace_query_dedup_total";
pub(crate) const METRIC_QUERY_FAILURE_TOTAL: &str = "blogspace_query_failure_total";
pub(crate) const METRIC_QUERY_FETCH_MS: &str = "blogspace_query_fetch_ms";

pub type Fetched<V> = Result<Arc<V>, RequestFailure>;

/// Handle to an in-flight fetch; every clone resolves to the same outcome.
pub type InFlight<V> = Shared<BoxFuture<'static, Fetched<V>>>;

/// Issues the underlying request for a key.
pub type Fetcher<V> =
    Arc<dyn Fn(QueryKey) -> BoxFuture<'static, Result<V, RequestFailure>> + Send + Sync>;

struct Entry<V> {
    phase: QueryPhase<V>,
    in_flight: Option<InFlight<V>>,
    observers: usize,
    invalidated: bool,
    failure_count: u32,
}

impl<V> Entry<V> {
    fn idle() -> Self {
        Self {
            phase: QueryPhase::Idle,
            in_flight: None,
            observers: 0,
            invalidated: false,
            failure_count: 0,
        }
    }

    fn snapshot(&self) -> QuerySnapshot<V> {
        QuerySnapshot {
            status: self.phase.status(),
            data: self.phase.data().cloned(),
            error: self.phase.error().cloned(),
            is_fetching: self.in_flight.is_some(),
            failure_count: self.failure_count,
        }
    }
}

/// In-memory store for one family of query keys.
pub struct QueryStore<V> {
    entries: Mutex<LruCache<QueryKey, Entry<V>>>,
    config: CacheConfig,
    fetcher: Fetcher<V>,
    changes: Arc<watch::Sender<u64>>,
}

impl<V> QueryStore<V>
where
    V: Send + Sync + 'static,
{
    /// Create a store holding at most `config.detail_entry_limit` keys.
    pub fn new(config: CacheConfig, fetcher: Fetcher<V>, changes: Arc<watch::Sender<u64>>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.detail_entry_limit_non_zero())),
            config,
            fetcher,
            changes,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current state of `key` without triggering anything.
    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot<V> {
        mutex_lock(&self.entries, SOURCE, "snapshot")
            .peek(key)
            .map_or_else(QuerySnapshot::idle, Entry::snapshot)
    }

    /// The in-flight fetch for `key`, if any.
    pub fn in_flight(&self, key: &QueryKey) -> Option<InFlight<V>> {
        mutex_lock(&self.entries, SOURCE, "in_flight")
            .peek(key)
            .and_then(|entry| entry.in_flight.clone())
    }

    /// Start a fetch for `key` when it is idle or stale, or unconditionally
    /// when `force` is set. Joins the running fetch if one exists, counting
    /// the join as a deduplicated request.
    pub fn ensure(self: &Arc<Self>, key: &QueryKey, force: bool) -> Option<InFlight<V>> {
        self.start(key, force, true)
    }

    /// Start a fetch for a stale or idle `key` on behalf of a passive read.
    /// Joining a running fetch here is not a new request.
    pub fn touch(self: &Arc<Self>, key: &QueryKey) -> Option<InFlight<V>> {
        self.start(key, false, false)
    }

    fn start(self: &Arc<Self>, key: &QueryKey, force: bool, request: bool) -> Option<InFlight<V>> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "ensure");
        let entry = entries.get_or_insert_mut(key.clone(), Entry::idle);

        if let Some(in_flight) = &entry.in_flight {
            if request {
                counter!(METRIC_QUERY_DEDUP_TOTAL, "query" => key.kind()).increment(1);
                debug!(query = %key, "joining in-flight fetch");
            }
            return Some(in_flight.clone());
        }

        if !force && !entry.phase.needs_fetch(now, self.config.stale_time) {
            return None;
        }

        debug!(query = %key, from = entry.phase.name(), force, "starting fetch");
        entry.phase.begin_fetch();
        entry.invalidated = false;
        entry.failure_count = 0;
        let in_flight = self.spawn_fetch(key.clone());
        entry.in_flight = Some(in_flight.clone());
        drop(entries);

        self.notify();
        Some(in_flight)
    }

    /// Register an observer. A new observer also retries a failed key.
    pub fn attach(self: &Arc<Self>, key: &QueryKey) -> Option<InFlight<V>> {
        let retry_failed = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "attach");
            let entry = entries.get_or_insert_mut(key.clone(), Entry::idle);
            entry.observers += 1;
            entry.phase.is_failed()
        };
        self.ensure(key, retry_failed)
    }

    pub fn detach(&self, key: &QueryKey) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "detach");
        if let Some(entry) = entries.peek_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
        }
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        mutex_lock(&self.entries, SOURCE, "observer_count")
            .peek(key)
            .map_or(0, |entry| entry.observers)
    }

    /// Mark `key` stale. Observed keys refetch right away whatever their
    /// phase, failed included; a fetch already in flight settles as stale
    /// and is refetched if still observed.
    pub fn invalidate(self: &Arc<Self>, key: &QueryKey) {
        let refetch = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate");
            let Some(entry) = entries.peek_mut(key) else {
                return;
            };
            if entry.in_flight.is_some() {
                entry.invalidated = true;
                false
            } else {
                entry.phase.invalidate();
                entry.observers > 0
            }
        };

        debug!(query = %key, refetch, "invalidated");
        self.notify();
        if refetch {
            self.start(key, true, false);
        }
    }

    fn spawn_fetch(self: &Arc<Self>, key: QueryKey) -> InFlight<V> {
        let store = Arc::clone(self);
        let operation = key.operation();
        let task_key = key.clone();
        let handle = tokio::spawn(async move { store.run(task_key).await });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(query = %key, error = %err, "fetch task did not complete");
                    Err(RequestFailure::transport(operation, err.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run(self: Arc<Self>, key: QueryKey) -> Fetched<V> {
        let started = Instant::now();
        let max_attempts = self.config.max_attempts();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            counter!(METRIC_QUERY_FETCH_TOTAL, "query" => key.kind()).increment(1);
            match (self.fetcher)(key.clone()).await {
                Ok(value) => break Ok(Arc::new(value)),
                Err(failure) if attempt < max_attempts => {
                    let delay = self.config.retry_delay_for(attempt - 1);
                    counter!(METRIC_QUERY_RETRY_TOTAL, "query" => key.kind()).increment(1);
                    debug!(
                        query = %key,
                        attempt,
                        reason = %failure.reason,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed; retrying"
                    );
                    self.record_failure(&key, attempt);
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => break Err(failure),
            }
        };

        histogram!(METRIC_QUERY_FETCH_MS, "query" => key.kind())
            .record(started.elapsed().as_secs_f64() * 1000.0);
        self.settle(&key, outcome.clone(), attempt);
        outcome
    }

    fn record_failure(&self, key: &QueryKey, attempt: u32) {
        if let Some(entry) = mutex_lock(&self.entries, SOURCE, "record_failure").peek_mut(key) {
            entry.failure_count = attempt;
        }
        self.notify();
    }

    fn settle(self: &Arc<Self>, key: &QueryKey, outcome: Fetched<V>, attempts: u32) {
        let refetch = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "settle");
            let Some(entry) = entries.peek_mut(key) else {
                debug!(query = %key, "entry evicted before fetch settled; result discarded");
                return;
            };

            match &outcome {
                Ok(_) => {
                    debug!(query = %key, attempts, "fetch settled");
                    entry.failure_count = 0;
                }
                Err(failure) => {
                    counter!(METRIC_QUERY_FAILURE_TOTAL, "query" => key.kind()).increment(1);
                    warn!(
                        query = %key,
                        attempts,
                        reason = %failure.reason,
                        "fetch failed after exhausting retries"
                    );
                    entry.failure_count = attempts;
                }
            }

            let invalidated = std::mem::take(&mut entry.invalidated);
            entry.in_flight = None;
            entry
                .phase
                .settle(outcome, attempts, Instant::now(), invalidated);
            invalidated && entry.observers > 0
        };

        self.notify();
        if refetch {
            self.start(key, true, false);
        }
    }

    fn notify(&self) {
        self.changes
            .send_modify(|version| *version = version.wrapping_add(1));
    }
}
