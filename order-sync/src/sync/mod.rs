//! Status propagation to the tracking store
//!
//! ```text
//! push ──> deliver ──(ok)──> done
//!             │
//!         (3 attempts, 1s / 2s backoff)
//!             │
//!             └──> OverflowQueue ──(every 30s, ≤10 items)──> deliver
//! ```

mod client;
mod queue;
mod worker;

pub use client::{DEFAULT_BACKOFF_BASE, DEFAULT_MAX_ATTEMPTS, RetryPolicy, SyncClient};
pub use queue::{
    DEFAULT_BATCH_SIZE, DEFAULT_RETENTION, DrainSummary, OverflowItem, OverflowQueue,
    QueueConfig, QueueStats,
};
pub use worker::{DEFAULT_DRAIN_INTERVAL, DrainWorker};
