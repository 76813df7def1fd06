//! Data models
//!
//! Shared between the order-of-record side, the tracking store side and the
//! sync engine. All order IDs are `i64`.

pub mod order;
pub mod order_status;
pub mod tracking;

// Re-exports
pub use order::*;
pub use order_status::*;
pub use tracking::*;
