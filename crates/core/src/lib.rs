//! `docflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error model, and the numeric
//! normalizer used for quantities and monetary amounts.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{
    DocumentId, MovementId, ProductId, SettlementId, TechnicianId, TenantId, UserId, WarehouseId,
    WorkOrderId,
};
pub use money::{Amount, Percentage};
