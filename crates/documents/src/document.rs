//! The document header shared by all five variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docflow_core::{Amount, DocumentId, DomainError, DomainResult, TenantId, UserId, WarehouseId};

use crate::item::{AdjustmentType, DocumentItem, ReturnDestination};
use crate::reconciliation::ReceiptLine;
use crate::status::{DocumentAction, DocumentKind, DocumentStatus};

/// Kind-specific header details. The tag is the document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentDetails {
    Adjustment {
        warehouse_id: WarehouseId,
        adjustment_type: AdjustmentType,
    },
    Transfer {
        source_warehouse_id: WarehouseId,
        destination_warehouse_id: WarehouseId,
    },
    InternalConsumption {
        warehouse_id: WarehouseId,
    },
    CustomerReturn {
        warehouse_id: WarehouseId,
    },
    Sale {
        warehouse_id: WarehouseId,
    },
}

impl DocumentDetails {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentDetails::Adjustment { .. } => DocumentKind::Adjustment,
            DocumentDetails::Transfer { .. } => DocumentKind::Transfer,
            DocumentDetails::InternalConsumption { .. } => DocumentKind::InternalConsumption,
            DocumentDetails::CustomerReturn { .. } => DocumentKind::CustomerReturn,
            DocumentDetails::Sale { .. } => DocumentKind::Sale,
        }
    }
}

/// A business document: header, items, lifecycle status.
///
/// Documents are created in their kind's initial (editable) status, advance
/// through the kind's transition table, and become immutable once they reach
/// a terminal status. `total_cost` is always derived from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    tenant_id: TenantId,
    number: String,
    status: DocumentStatus,
    created_at: DateTime<Utc>,
    items: Vec<DocumentItem>,
    details: DocumentDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_actor: Option<UserId>,
}

impl Document {
    pub fn new(
        id: DocumentId,
        tenant_id: TenantId,
        number: String,
        details: DocumentDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        let status = details.kind().initial_status();
        Self {
            id,
            tenant_id,
            number,
            status,
            created_at,
            items: Vec::new(),
            details,
            rejection_reason: None,
            last_actor: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[DocumentItem] {
        &self.items
    }

    pub fn details(&self) -> &DocumentDetails {
        &self.details
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// The user who drove the most recent lifecycle transition.
    pub fn last_actor(&self) -> Option<UserId> {
        self.last_actor
    }

    /// Documents are editable only in their initial status.
    pub fn is_editable(&self) -> bool {
        self.status == self.kind().initial_status()
    }

    /// Derived document total: `Σ item.quantity * item.unit_cost`.
    pub fn total_cost(&self) -> DomainResult<Amount> {
        self.items
            .iter()
            .try_fold(Amount::ZERO, |acc, item| Ok(acc + item.total_cost()?))
    }

    pub fn ensure_tenant(&self, tenant_id: TenantId) -> DomainResult<()> {
        if self.tenant_id != tenant_id {
            return Err(DomainError::conflict("tenant mismatch"));
        }
        Ok(())
    }

    /// Replace the item set. Only legal while editable; every item must pass
    /// finalization checks.
    pub fn replace_items(&mut self, items: Vec<DocumentItem>) -> DomainResult<()> {
        if !self.is_editable() {
            return Err(DomainError::validation(
                "document can no longer be modified in its current status",
            ));
        }
        for item in &items {
            item.validate()?;
        }
        self.items = items;
        Ok(())
    }

    /// Replace the header details. Only legal while editable, and the kind
    /// is fixed at creation.
    pub fn replace_details(&mut self, details: DocumentDetails) -> DomainResult<()> {
        if !self.is_editable() {
            return Err(DomainError::validation(
                "document can no longer be modified in its current status",
            ));
        }
        if details.kind() != self.kind() {
            return Err(DomainError::validation("document kind cannot change"));
        }
        self.details = details;
        Ok(())
    }

    /// Resolve the status this action would advance to, per the kind's table.
    pub fn next_status(&self, action: DocumentAction) -> DomainResult<DocumentStatus> {
        self.kind().transitions().next(self.status, action)
    }

    /// Commit a previously validated status change. Callers must have gone
    /// through `next_status` and applied any effects first.
    pub fn commit_status(&mut self, status: DocumentStatus) {
        self.status = status;
    }

    /// Record who drove a transition, for the audit trail.
    pub fn record_actor(&mut self, actor: UserId) {
        self.last_actor = Some(actor);
    }

    /// Checks that must pass before any stock-affecting transition: at least
    /// one item, each finalized (positive quantity, non-negative cost).
    pub fn ensure_finalizable(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("document has no items"));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    /// Record a rejection reason. Absence or an empty string is a validation
    /// error, never a silent default.
    pub fn set_rejection_reason(&mut self, reason: &str) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("rejection_reason is required"));
        }
        self.rejection_reason = Some(reason.trim().to_string());
        Ok(())
    }

    /// Assign per-item destinations on customer-return approval, positionally.
    pub fn assign_destinations(&mut self, destinations: &[ReturnDestination]) -> DomainResult<()> {
        if self.kind() != DocumentKind::CustomerReturn {
            return Err(DomainError::validation(
                "destinations only apply to customer returns",
            ));
        }
        if destinations.len() != self.items.len() {
            return Err(DomainError::validation(format!(
                "expected {} destinations, got {}",
                self.items.len(),
                destinations.len()
            )));
        }
        for (item, destination) in self.items.iter_mut().zip(destinations) {
            item.destination = Some(*destination);
        }
        Ok(())
    }

    /// Snapshot declared quantities when a transfer leaves the source
    /// warehouse.
    pub fn record_send(&mut self) -> DomainResult<()> {
        if self.kind() != DocumentKind::Transfer {
            return Err(DomainError::validation("only transfers are sent"));
        }
        for item in &mut self.items {
            item.quantity_sent = Some(item.quantity);
        }
        Ok(())
    }

    /// Record actual received quantities and conditions, positionally.
    ///
    /// Zero is legal (line fully lost in transit); receiving more than was
    /// sent is legal too — discrepancies are flagged by reconciliation, not
    /// rejected here.
    pub fn record_receipt(&mut self, receipts: &[ReceiptLine]) -> DomainResult<()> {
        if self.kind() != DocumentKind::Transfer {
            return Err(DomainError::validation("only transfers are received"));
        }
        if receipts.len() != self.items.len() {
            return Err(DomainError::validation(format!(
                "expected {} receipt lines, got {}",
                self.items.len(),
                receipts.len()
            )));
        }
        for receipt in receipts {
            if receipt.quantity_received < 0 {
                return Err(DomainError::validation(
                    "quantity_received cannot be negative",
                ));
            }
        }
        for (item, receipt) in self.items.iter_mut().zip(receipts) {
            item.quantity_received = Some(receipt.quantity_received);
            item.condition = Some(receipt.condition);
        }
        Ok(())
    }
}
