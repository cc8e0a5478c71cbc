//! Transfer receipt reconciliation: declared vs. actual quantities.
//!
//! Discrepancies are advisory, never blocking — the receive transition
//! succeeds regardless, and the caller decides whether to surface a
//! confirmation step to a human.

use serde::{Deserialize, Serialize};

use docflow_core::{DomainError, DomainResult, ProductId};

use crate::item::{DocumentItem, ItemCondition};

/// One receipt input line, positional against the transfer's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub quantity_received: i64,
    pub condition: ItemCondition,
}

/// Per-line comparison of sent vs. received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReconciliation {
    pub product_id: ProductId,
    pub quantity_sent: i64,
    pub quantity_received: i64,
    pub condition: ItemCondition,
    /// `quantity_received - quantity_sent`; negative means loss in transit,
    /// positive means a miscount correction.
    pub difference: i64,
}

/// Derived reconciliation summary. Computed for reporting, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReconciliation {
    pub lines: Vec<LineReconciliation>,
    pub total_sent: i64,
    pub total_received: i64,
    pub total_difference: i64,
    pub has_discrepancy: bool,
}

/// Compare a received transfer's items line by line.
///
/// Every item must already carry `quantity_sent` and `quantity_received`
/// (i.e. the transfer has been sent and a receipt recorded).
pub fn reconcile(items: &[DocumentItem]) -> DomainResult<TransferReconciliation> {
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let quantity_sent = item
            .quantity_sent
            .ok_or_else(|| DomainError::validation("item has no quantity_sent"))?;
        let quantity_received = item
            .quantity_received
            .ok_or_else(|| DomainError::validation("item has no quantity_received"))?;
        let condition = item.condition.unwrap_or(ItemCondition::Good);

        lines.push(LineReconciliation {
            product_id: item.product_id,
            quantity_sent,
            quantity_received,
            condition,
            difference: quantity_received - quantity_sent,
        });
    }

    let total_sent = lines.iter().map(|l| l.quantity_sent).sum();
    let total_received = lines.iter().map(|l| l.quantity_received).sum();
    let has_discrepancy = lines.iter().any(|l| l.difference != 0);

    Ok(TransferReconciliation {
        total_sent,
        total_received,
        total_difference: total_received - total_sent,
        has_discrepancy,
        lines,
    })
}
