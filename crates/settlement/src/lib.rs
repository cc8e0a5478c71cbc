//! `docflow-settlement` — idempotent commission settlement.
//!
//! Converts a technician's unclaimed labor amounts in a closed date range
//! into one payable commission record. Consumed work orders are permanently
//! marked (`settled_at`), which is the sole concurrency-safety anchor: a
//! second settlement over an overlapping range simply selects nothing.

pub mod engine;
pub mod work_order;

pub use engine::{CommissionSettlement, SettlementEngine, SettlementPreview};
pub use work_order::WorkOrder;
