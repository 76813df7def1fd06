//! Order-of-record write path

mod service;

pub use service::OrderStatusService;
