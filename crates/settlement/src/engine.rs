//! Preview and create commission settlements.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use docflow_core::{
    Amount, DomainError, DomainResult, Percentage, SettlementId, TechnicianId, TenantId,
    WorkOrderId,
};

use crate::work_order::WorkOrder;

/// A committed commission payout. Created once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSettlement {
    pub id: SettlementId,
    pub number: String,
    pub tenant_id: TenantId,
    pub technician_id: TechnicianId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub commission_percentage: Percentage,
    pub base_amount: Amount,
    pub commission_amount: Amount,
    pub order_ids: Vec<WorkOrderId>,
    pub created_at: DateTime<Utc>,
}

/// What a settlement over the period would pay, without committing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPreview {
    pub orders: Vec<WorkOrder>,
    pub base_amount: Amount,
    pub commission_amount: Amount,
}

#[derive(Debug, Default)]
struct SettlementState {
    orders: HashMap<WorkOrderId, WorkOrder>,
    settlements: Vec<CommissionSettlement>,
    sequences: HashMap<TenantId, u64>,
}

impl SettlementState {
    fn select(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<WorkOrder> {
        let mut selected: Vec<WorkOrder> = self
            .orders
            .values()
            .filter(|o| o.is_eligible(tenant_id, technician_id, from, to))
            .cloned()
            .collect();
        selected.sort_by_key(|o| (o.completed_on, *o.id.as_uuid()));
        selected
    }
}

/// Settlement engine: work-order registry plus settlement records.
///
/// All state lives behind one `RwLock`, so `create` selects, marks, and
/// records inside a single write-lock unit — two overlapping `create` calls
/// can never count the same order twice, and a failed call marks nothing.
#[derive(Debug, Default)]
pub struct SettlementEngine {
    state: RwLock<SettlementState>,
}

fn lock_poisoned() -> DomainError {
    DomainError::conflict("settlement state lock poisoned")
}

fn validate_period(from: NaiveDate, to: NaiveDate) -> DomainResult<()> {
    if from > to {
        return Err(DomainError::validation("date_from must not exceed date_to"));
    }
    Ok(())
}

fn validate_percentage(percentage: Percentage) -> DomainResult<()> {
    if percentage.basis_points() < 0 {
        return Err(DomainError::validation(
            "commission_percentage cannot be negative",
        ));
    }
    Ok(())
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a work order as it becomes known to the engine.
    pub fn register_order(&self, order: WorkOrder) -> DomainResult<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        if state.orders.contains_key(&order.id) {
            return Err(DomainError::conflict("work order already registered"));
        }
        state.orders.insert(order.id, order);
        Ok(())
    }

    pub fn order(
        &self,
        tenant_id: TenantId,
        id: WorkOrderId,
    ) -> DomainResult<Option<WorkOrder>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .orders
            .get(&id)
            .filter(|o| o.tenant_id == tenant_id)
            .cloned())
    }

    /// Pure read: what a settlement over `[date_from, date_to]` would pay.
    /// Never touches `settled_at`.
    pub fn preview(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        date_from: NaiveDate,
        date_to: NaiveDate,
        commission_percentage: Percentage,
    ) -> DomainResult<SettlementPreview> {
        validate_period(date_from, date_to)?;
        validate_percentage(commission_percentage)?;

        let state = self.state.read().map_err(|_| lock_poisoned())?;
        let orders = state.select(tenant_id, technician_id, date_from, date_to);
        let base_amount: Amount = orders.iter().map(|o| o.labor_amount).sum();
        let commission_amount = commission_percentage.apply(base_amount);

        Ok(SettlementPreview {
            orders,
            base_amount,
            commission_amount,
        })
    }

    /// Re-run the preview selection and commit it: create the settlement and
    /// mark every selected order, both-or-neither.
    pub fn create(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        date_from: NaiveDate,
        date_to: NaiveDate,
        commission_percentage: Percentage,
        now: DateTime<Utc>,
    ) -> DomainResult<CommissionSettlement> {
        validate_period(date_from, date_to)?;
        validate_percentage(commission_percentage)?;

        let mut state = self.state.write().map_err(|_| lock_poisoned())?;

        let selected = state.select(tenant_id, technician_id, date_from, date_to);
        if selected.is_empty() {
            return Err(DomainError::NothingToSettle);
        }

        let base_amount: Amount = selected.iter().map(|o| o.labor_amount).sum();
        let commission_amount = commission_percentage.apply(base_amount);
        let order_ids: Vec<WorkOrderId> = selected.iter().map(|o| o.id).collect();

        // Claim every order before recording the settlement; still under the
        // same write lock, so a failure here leaves no partial markings.
        for id in &order_ids {
            let order = state.orders.get_mut(id).ok_or(DomainError::NotFound)?;
            order.mark_settled(now)?;
        }

        let sequence = state.sequences.entry(tenant_id).or_insert(0);
        *sequence += 1;
        let number = format!("LIQ-{:06}", *sequence);

        let settlement = CommissionSettlement {
            id: SettlementId::new(),
            number,
            tenant_id,
            technician_id,
            date_from,
            date_to,
            commission_percentage,
            base_amount,
            commission_amount,
            order_ids,
            created_at: now,
        };
        state.settlements.push(settlement.clone());
        Ok(settlement)
    }

    pub fn settlements(&self, tenant_id: TenantId) -> DomainResult<Vec<CommissionSettlement>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .settlements
            .iter()
            .filter(|st| st.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    pub fn settlement(
        &self,
        tenant_id: TenantId,
        id: SettlementId,
    ) -> DomainResult<Option<CommissionSettlement>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .settlements
            .iter()
            .find(|s| s.tenant_id == tenant_id && s.id == id)
            .cloned())
    }
}
