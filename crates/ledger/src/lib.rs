//! `docflow-ledger` — append-only stock movement log.
//!
//! Current stock for a `(product, warehouse)` pair is the running sum of its
//! movements, maintained as a projection that is read and updated under the
//! same lock as the movement append — "current stock" and "history" cannot
//! drift apart.

pub mod movement;
pub mod stock;

pub use movement::{Direction, MovementSpec, StockMovement};
pub use stock::StockLedger;
