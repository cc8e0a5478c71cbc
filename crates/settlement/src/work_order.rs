//! Work orders: external collaborators referenced by settlements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use docflow_core::{Amount, DomainError, DomainResult, TechnicianId, TenantId, WorkOrderId};

/// A workshop work order. Owned elsewhere; the settlement engine only reads
/// `labor_amount` and claims the order via `settled_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub tenant_id: TenantId,
    pub technician_id: TechnicianId,
    /// Business date the order was completed; settlement periods select on
    /// this, inclusively on both bounds.
    pub completed_on: NaiveDate,
    pub labor_amount: Amount,
    /// Once set, the order is permanently ineligible for any future
    /// settlement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl WorkOrder {
    pub fn new(
        id: WorkOrderId,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        completed_on: NaiveDate,
        labor_amount: Amount,
    ) -> Self {
        Self {
            id,
            tenant_id,
            technician_id,
            completed_on,
            labor_amount,
            settled_at: None,
        }
    }

    /// Eligible for settlement by `technician_id` over `[from, to]`.
    pub fn is_eligible(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> bool {
        self.tenant_id == tenant_id
            && self.technician_id == technician_id
            && self.settled_at.is_none()
            && self.completed_on >= from
            && self.completed_on <= to
    }

    /// Claim this order for a settlement. Claiming an already-claimed order
    /// is the underlying fact counted twice — rejected, never overwritten.
    pub fn mark_settled(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.settled_at.is_some() {
            return Err(DomainError::AlreadySettled(self.id.to_string()));
        }
        self.settled_at = Some(at);
        Ok(())
    }
}
