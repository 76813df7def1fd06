//! Reconciliation report types
//!
//! Serialized in camelCase; this shape is what admin surfaces render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared::OrderStatus;
use std::fmt;
use std::str::FromStr;

/// Wire literal for an order the tracking store does not know
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Status as seen by the tracking store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedStatus {
    Found(OrderStatus),
    NotFound,
}

impl CachedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found(status) => status.as_str(),
            Self::NotFound => NOT_FOUND,
        }
    }

    pub fn status(&self) -> Option<OrderStatus> {
        match self {
            Self::Found(status) => Some(*status),
            Self::NotFound => None,
        }
    }
}

impl From<Option<OrderStatus>> for CachedStatus {
    fn from(status: Option<OrderStatus>) -> Self {
        status.map_or(Self::NotFound, Self::Found)
    }
}

impl fmt::Display for CachedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CachedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CachedStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == NOT_FOUND {
            return Ok(Self::NotFound);
        }
        OrderStatus::from_str(&raw)
            .map(Self::Found)
            .map_err(serde::de::Error::custom)
    }
}

/// One order whose tracking status disagrees with the order-of-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub order_id: i64,
    pub authoritative_status: OrderStatus,
    pub cached_status: CachedStatus,
    pub authoritative_updated_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

/// Overall verdict of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyState {
    Consistent,
    Inconsistent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub total: usize,
    pub discrepancy_count: usize,
    /// Orders whose tracking lookup failed; not counted as discrepancies
    pub error_count: usize,
    pub consistency_percentage: f64,
    pub discrepancies: Vec<Discrepancy>,
    pub state: ConsistencyState,
    pub timestamp: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn new(total: usize, discrepancies: Vec<Discrepancy>, error_count: usize) -> Self {
        let discrepancy_count = discrepancies.len();
        let state = if discrepancy_count == 0 {
            ConsistencyState::Consistent
        } else {
            ConsistencyState::Inconsistent
        };
        Self {
            total,
            discrepancy_count,
            error_count,
            consistency_percentage: consistency_percentage(total, discrepancy_count),
            discrepancies,
            state,
            timestamp: Utc::now(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.state == ConsistencyState::Consistent
    }
}

/// (total − discrepancies) / total × 100, or 100 for an empty scan
pub fn consistency_percentage(total: usize, discrepancy_count: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let consistent = total.saturating_sub(discrepancy_count);
    consistent as f64 / total as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairFailure {
    pub order_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairResult {
    pub attempted: usize,
    pub repaired_orders: Vec<i64>,
    pub failures: Vec<RepairFailure>,
    pub timestamp: DateTime<Utc>,
}

impl RepairResult {
    pub fn repaired_count(&self) -> usize {
        self.repaired_orders.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Outcome of repairing a single order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairOutcome {
    /// Tracking store was written with the authoritative status
    #[serde(rename_all = "camelCase")]
    Repaired {
        order_id: i64,
        previous: CachedStatus,
        status: OrderStatus,
    },
    /// Nothing to do
    #[serde(rename_all = "camelCase")]
    AlreadyConsistent { order_id: i64, status: OrderStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_percentage() {
        assert_eq!(consistency_percentage(0, 0), 100.0);
        assert_eq!(consistency_percentage(4, 0), 100.0);
        assert_eq!(consistency_percentage(4, 1), 75.0);
        assert_eq!(consistency_percentage(3, 3), 0.0);
    }

    #[test]
    fn test_cached_status_wire_format() {
        let json = serde_json::to_value(CachedStatus::NotFound).unwrap();
        assert_eq!(json, serde_json::json!("NOT_FOUND"));

        let json = serde_json::to_value(CachedStatus::Found(OrderStatus::Pending)).unwrap();
        assert_eq!(json, serde_json::json!("PENDING"));

        let parsed: CachedStatus = serde_json::from_str("\"NOT_FOUND\"").unwrap();
        assert_eq!(parsed, CachedStatus::NotFound);
        assert!(serde_json::from_str::<CachedStatus>("\"LOST\"").is_err());
    }

    #[test]
    fn test_report_shape() {
        let now = Utc::now();
        let report = ReconciliationReport::new(
            2,
            vec![Discrepancy {
                order_id: 1,
                authoritative_status: OrderStatus::Shipped,
                cached_status: CachedStatus::Found(OrderStatus::Pending),
                authoritative_updated_at: now,
                timestamp: now,
            }],
            0,
        );
        assert!(!report.is_consistent());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["discrepancyCount"], 1);
        assert_eq!(json["consistencyPercentage"], 50.0);
        assert_eq!(json["state"], "INCONSISTENT");
        assert_eq!(json["discrepancies"][0]["authoritativeStatus"], "SHIPPED");
        assert_eq!(json["discrepancies"][0]["cachedStatus"], "PENDING");
    }

    #[test]
    fn test_repair_outcome_tagged() {
        let outcome = RepairOutcome::Repaired {
            order_id: 2,
            previous: CachedStatus::NotFound,
            status: OrderStatus::Processing,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "REPAIRED");
        assert_eq!(json["orderId"], 2);
        assert_eq!(json["previous"], "NOT_FOUND");
    }
}
