//! Shared types for the order sync workspace
//!
//! Status set, order/tracking records, sync protocol types and the unified
//! error system used by both stores and the sync engine.

pub mod error;
pub mod models;
pub mod sync;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    HISTORY_CAPACITY, HistoryEntry, OrderStatus, OrderStatusRecord, StatusHistory, TrackingRecord,
    TrackingStatistics,
};
pub use serde::{Deserialize, Serialize};
pub use sync::{Credential, OrderStatusUpdate, StatusPayload};
