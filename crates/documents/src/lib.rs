//! `docflow-documents` — business document variants.
//!
//! Five document kinds (adjustment, transfer, internal consumption, customer
//! return, sale) share one lifecycle validator (`docflow-workflow`) and
//! differ only in their transition tables, header details, and the stock
//! effects their transitions derive. This crate contains business rules
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod document;
pub mod effects;
pub mod item;
pub mod reconciliation;
pub mod status;

pub use document::{Document, DocumentDetails};
pub use effects::{effects_for, reverses_prior_movements};
pub use item::{AdjustmentType, DocumentItem, ItemCondition, ReturnDestination};
pub use reconciliation::{ReceiptLine, TransferReconciliation, reconcile};
pub use status::{DocumentAction, DocumentKind, DocumentStatus};
