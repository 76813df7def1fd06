//! Reconciliation engine
//!
//! Scans the order-of-record, looks every order up in the tracking store and
//! reports where they disagree. Repairs always push the authoritative status
//! into the tracking store, never the other way round.

use shared::{AppError, AppResult, Credential, OrderStatusRecord, OrderStatusUpdate};
use std::sync::Arc;

use super::report::{
    CachedStatus, Discrepancy, ReconciliationReport, RepairFailure, RepairOutcome, RepairResult,
};
use crate::delivery::{Delivery, TrackingLookup};
use crate::store::OrderRecordSource;

pub struct ReconciliationEngine {
    orders: Arc<dyn OrderRecordSource>,
    tracking: Arc<dyn TrackingLookup>,
    delivery: Arc<dyn Delivery>,
}

impl ReconciliationEngine {
    pub fn new(
        orders: Arc<dyn OrderRecordSource>,
        tracking: Arc<dyn TrackingLookup>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Self {
            orders,
            tracking,
            delivery,
        }
    }

    /// Compare both stores
    ///
    /// Fails only when the order-of-record cannot be scanned. A failed
    /// tracking lookup is counted in `error_count` and the scan goes on.
    pub async fn compare(&self, credential: &Credential) -> AppResult<ReconciliationReport> {
        let records = self.orders.list_orders(credential).await?;
        let total = records.len();
        tracing::info!(target: "reconcile", total, "Reconciliation scan started");

        let mut discrepancies = Vec::new();
        let mut error_count = 0;

        for record in &records {
            match self.tracking.fetch(record.order_id, credential).await {
                Ok(tracked) => {
                    let cached = CachedStatus::from(tracked.map(|t| t.status));
                    if cached != CachedStatus::Found(record.status) {
                        tracing::debug!(
                            target: "reconcile",
                            order_id = record.order_id,
                            authoritative = %record.status,
                            cached = %cached,
                            "Discrepancy found"
                        );
                        discrepancies.push(discrepancy(record, cached));
                    }
                }
                Err(e) => {
                    error_count += 1;
                    tracing::warn!(
                        target: "reconcile",
                        order_id = record.order_id,
                        "Tracking lookup failed: {e}"
                    );
                }
            }
        }

        let report = ReconciliationReport::new(total, discrepancies, error_count);
        tracing::info!(
            target: "reconcile",
            total = report.total,
            discrepancies = report.discrepancy_count,
            errors = report.error_count,
            consistency = report.consistency_percentage,
            "Reconciliation scan finished"
        );
        Ok(report)
    }

    /// Push the authoritative status of every discrepancy in `report`
    ///
    /// One failed item never stops the others.
    pub async fn repair(
        &self,
        report: &ReconciliationReport,
        credential: &Credential,
    ) -> RepairResult {
        let mut repaired_orders = Vec::new();
        let mut failures = Vec::new();

        for d in &report.discrepancies {
            let update = OrderStatusUpdate::new(d.order_id, d.authoritative_status);
            match self.delivery.deliver(&update, credential).await {
                Ok(()) => {
                    tracing::info!(
                        target: "reconcile",
                        order_id = d.order_id,
                        "Repaired tracking status {} -> {}",
                        d.cached_status,
                        d.authoritative_status
                    );
                    repaired_orders.push(d.order_id);
                }
                Err(e) => {
                    tracing::error!(target: "reconcile", order_id = d.order_id, "Repair failed: {e}");
                    failures.push(RepairFailure {
                        order_id: d.order_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        let result = RepairResult {
            attempted: report.discrepancies.len(),
            repaired_orders,
            failures,
            timestamp: chrono::Utc::now(),
        };
        tracing::info!(
            target: "reconcile",
            attempted = result.attempted,
            repaired = result.repaired_count(),
            failed = result.failed_count(),
            "Repair pass finished"
        );
        result
    }

    /// Compare and, if needed, repair a single order
    pub async fn repair_one(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> AppResult<RepairOutcome> {
        let record = self
            .orders
            .get_order(order_id, credential)
            .await?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        let tracked = self.tracking.fetch(order_id, credential).await?;
        let cached = CachedStatus::from(tracked.map(|t| t.status));
        if cached == CachedStatus::Found(record.status) {
            return Ok(RepairOutcome::AlreadyConsistent {
                order_id,
                status: record.status,
            });
        }

        self.delivery
            .deliver(&OrderStatusUpdate::new(order_id, record.status), credential)
            .await?;
        tracing::info!(
            target: "reconcile",
            order_id,
            "Repaired tracking status {} -> {}",
            cached,
            record.status
        );

        Ok(RepairOutcome::Repaired {
            order_id,
            previous: cached,
            status: record.status,
        })
    }
}

fn discrepancy(record: &OrderStatusRecord, cached: CachedStatus) -> Discrepancy {
    Discrepancy {
        order_id: record.order_id,
        authoritative_status: record.status,
        cached_status: cached,
        authoritative_updated_at: record.updated_at,
        timestamp: chrono::Utc::now(),
    }
}
