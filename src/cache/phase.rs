//! Per-key query state machine.
//!
//! `Idle → Fetching → Fresh | Failed`, `Fresh → Stale` on expiry or
//! invalidation, `Stale → Fetching` on the next observation. `Failed` only
//! leaves through an explicit refetch or a new observer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::api::RequestFailure;

pub enum QueryPhase<V> {
    Idle,
    Fetching {
        previous: Option<Arc<V>>,
    },
    Fresh {
        data: Arc<V>,
        fetched_at: Instant,
    },
    Stale {
        data: Arc<V>,
    },
    Failed {
        error: RequestFailure,
        attempts: u32,
        previous: Option<Arc<V>>,
    },
}

impl<V> QueryPhase<V> {
    pub fn data(&self) -> Option<&Arc<V>> {
        match self {
            QueryPhase::Idle => None,
            QueryPhase::Fetching { previous } | QueryPhase::Failed { previous, .. } => {
                previous.as_ref()
            }
            QueryPhase::Fresh { data, .. } | QueryPhase::Stale { data } => Some(data),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QueryPhase::Idle => "idle",
            QueryPhase::Fetching { .. } => "fetching",
            QueryPhase::Fresh { .. } => "fresh",
            QueryPhase::Stale { .. } => "stale",
            QueryPhase::Failed { .. } => "failed",
        }
    }

    /// Whether an observation at `now` should start a fetch on its own.
    pub fn needs_fetch(&self, now: Instant, stale_time: Duration) -> bool {
        match self {
            QueryPhase::Idle | QueryPhase::Stale { .. } => true,
            QueryPhase::Fresh { fetched_at, .. } => {
                now.saturating_duration_since(*fetched_at) >= stale_time
            }
            QueryPhase::Fetching { .. } | QueryPhase::Failed { .. } => false,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryPhase::Failed { .. })
    }

    /// Enter `Fetching`, keeping whatever data was visible.
    pub fn begin_fetch(&mut self) {
        let previous = self.data().cloned();
        *self = QueryPhase::Fetching { previous };
    }

    /// Record the outcome of a fetch. A result that was invalidated while in
    /// flight lands as `Stale`.
    pub fn settle(
        &mut self,
        outcome: Result<Arc<V>, RequestFailure>,
        attempts: u32,
        now: Instant,
        invalidated: bool,
    ) {
        *self = match outcome {
            Ok(data) if invalidated => QueryPhase::Stale { data },
            Ok(data) => QueryPhase::Fresh {
                data,
                fetched_at: now,
            },
            Err(error) => QueryPhase::Failed {
                error,
                attempts,
                previous: self.data().cloned(),
            },
        };
    }

    /// Mark fresh data stale. Returns true when the phase changed.
    pub fn invalidate(&mut self) -> bool {
        if let QueryPhase::Fresh { data, .. } = self {
            let data = Arc::clone(data);
            *self = QueryPhase::Stale { data };
            return true;
        }
        false
    }

    pub fn status(&self) -> QueryStatus {
        match self {
            QueryPhase::Idle => QueryStatus::Idle,
            QueryPhase::Fetching { previous: None } => QueryStatus::Loading,
            QueryPhase::Fetching { previous: Some(_) }
            | QueryPhase::Fresh { .. }
            | QueryPhase::Stale { .. } => QueryStatus::Success,
            QueryPhase::Failed { .. } => QueryStatus::Error,
        }
    }

    pub fn error(&self) -> Option<&RequestFailure> {
        match self {
            QueryPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<V> fmt::Debug for QueryPhase<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer-facing summary of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched, or disabled (no identifier).
    Idle,
    /// First fetch in flight with nothing to show yet.
    Loading,
    /// Data available; a background refetch may be running.
    Success,
    /// Retries exhausted.
    Error,
}

/// Point-in-time view of a query key.
pub struct QuerySnapshot<V> {
    pub status: QueryStatus,
    pub data: Option<Arc<V>>,
    pub error: Option<RequestFailure>,
    pub is_fetching: bool,
    pub failure_count: u32,
}

impl<V> QuerySnapshot<V> {
    /// The always-idle, dataless state of a disabled query.
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            failure_count: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

impl<V> Clone for QuerySnapshot<V> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            failure_count: self.failure_count,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for QuerySnapshot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySnapshot")
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("failure_count", &self.failure_count)
            .finish()
    }
}
