//! Blogspace Request Cache
//!
//! In-memory query cache for the two reads the client performs:
//!
//! - **`all-articles`**: the collection listing
//! - **`article-detail(id)`**: one article by identifier
//!
//! Each key runs its own phase machine (see [`QueryPhase`]) with
//! deduplicated in-flight fetches, a staleness window, bounded read retries
//! and explicit invalidation.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `blogspace.toml`:
//!
//! ```toml
//! [cache]
//! stale_time_seconds = 300
//! retry = 2
//! retry_delay_ms = 1000
//! # ... see config.rs for all options
//! ```

mod client;
mod config;
mod keys;
mod lock;
mod phase;
mod store;

pub use client::{QueryClient, QueryObserver};
pub use config::CacheConfig;
pub use keys::QueryKey;
pub use phase::{QueryPhase, QuerySnapshot, QueryStatus};
pub use store::{Fetched, Fetcher, InFlight, QueryStore};

pub(crate) use store::{
    METRIC_QUERY_DEDUP_TOTAL, METRIC_QUERY_FAILURE_TOTAL, METRIC_QUERY_FETCH_MS,
    METRIC_QUERY_FETCH_TOTAL, METRIC_QUERY_RETRY_TOTAL,
};
