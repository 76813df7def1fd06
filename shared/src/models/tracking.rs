//! Tracking store records

use super::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Maximum history entries retained per order
pub const HISTORY_CAPACITY: usize = 50;

/// One status change as seen by the tracking store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// None on the entry that created the record
    #[serde(default)]
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
}

/// Current tracking state of an order (history travels separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub order_id: i64,
    pub status: OrderStatus,
    pub last_updated_at: DateTime<Utc>,
}

/// Bounded, newest-first status history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    entries: VecDeque<HistoryEntry>,
}

impl StatusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, dropping the oldest ones past [`HISTORY_CAPACITY`]
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

/// Aggregate view over the tracking store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStatistics {
    pub total_tracked_orders: usize,
    pub status_distribution: BTreeMap<OrderStatus, usize>,
    pub generated_at: DateTime<Utc>,
}
