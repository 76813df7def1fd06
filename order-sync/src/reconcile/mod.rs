//! Reconciliation between the order-of-record and the tracking store

mod engine;
mod report;
mod scheduler;

pub use engine::ReconciliationEngine;
pub use report::{
    CachedStatus, ConsistencyState, Discrepancy, NOT_FOUND, ReconciliationReport, RepairFailure,
    RepairOutcome, RepairResult, consistency_percentage,
};
pub use scheduler::ReconcileScheduler;
