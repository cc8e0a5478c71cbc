//! Stock effects per (document kind, transition).
//!
//! This is the matrix that makes the generic state machine insufficient on
//! its own: each variant maps specific transitions to specific ledger
//! movements. Effects are derived here as pure `MovementSpec`s; the
//! orchestration layer applies them atomically with the status change.

use docflow_core::{DomainError, DomainResult};
use docflow_ledger::{Direction, MovementSpec};

use crate::document::{Document, DocumentDetails};
use crate::item::{AdjustmentType, ReturnDestination};
use crate::status::{DocumentAction, DocumentKind};

/// Whether this transition reverses the document's own prior movements
/// instead of deriving new ones. Reversal uses the exact recorded movements,
/// never a recomputation from current state.
pub fn reverses_prior_movements(kind: DocumentKind, action: DocumentAction) -> bool {
    kind == DocumentKind::Sale && action == DocumentAction::Cancel
}

/// Derive the forward stock movements `action` triggers on `document`.
///
/// Transitions with no stock effect (e.g. reject, adjustment cancel) yield
/// an empty list. Sale cancellation is excluded — see
/// [`reverses_prior_movements`].
pub fn effects_for(document: &Document, action: DocumentAction) -> DomainResult<Vec<MovementSpec>> {
    match (document.details(), action) {
        (
            DocumentDetails::Adjustment {
                warehouse_id,
                adjustment_type,
            },
            DocumentAction::Confirm,
        ) => {
            let direction = match adjustment_type {
                AdjustmentType::Entrada => Direction::In,
                AdjustmentType::Salida => Direction::Out,
            };
            Ok(document
                .items()
                .iter()
                .map(|item| MovementSpec {
                    product_id: item.product_id,
                    warehouse_id: *warehouse_id,
                    direction,
                    quantity: item.quantity,
                })
                .collect())
        }

        // Source availability drops immediately; goods are in flight until
        // received.
        (
            DocumentDetails::Transfer {
                source_warehouse_id,
                ..
            },
            DocumentAction::Send,
        ) => Ok(document
            .items()
            .iter()
            .map(|item| MovementSpec {
                product_id: item.product_id,
                warehouse_id: *source_warehouse_id,
                direction: Direction::Out,
                quantity: item.quantity,
            })
            .collect()),

        // The destination gains what actually arrived, not what was declared.
        (
            DocumentDetails::Transfer {
                destination_warehouse_id,
                ..
            },
            DocumentAction::Receive,
        ) => {
            let mut specs = Vec::new();
            for item in document.items() {
                let received = item.quantity_received.ok_or_else(|| {
                    DomainError::validation("item has no quantity_received")
                })?;
                if received > 0 {
                    specs.push(MovementSpec {
                        product_id: item.product_id,
                        warehouse_id: *destination_warehouse_id,
                        direction: Direction::In,
                        quantity: received,
                    });
                }
            }
            Ok(specs)
        }

        (DocumentDetails::InternalConsumption { warehouse_id }, DocumentAction::Approve) => {
            Ok(document
                .items()
                .iter()
                .map(|item| MovementSpec {
                    product_id: item.product_id,
                    warehouse_id: *warehouse_id,
                    direction: Direction::Out,
                    quantity: item.quantity,
                })
                .collect())
        }

        // Only lines returned to inventory touch stock; discard and repair
        // move money, not goods.
        (DocumentDetails::CustomerReturn { warehouse_id }, DocumentAction::Approve) => {
            let mut specs = Vec::new();
            for item in document.items() {
                let destination = item.destination.ok_or_else(|| {
                    DomainError::validation("item has no destination")
                })?;
                if destination == ReturnDestination::Inventory {
                    specs.push(MovementSpec {
                        product_id: item.product_id,
                        warehouse_id: *warehouse_id,
                        direction: Direction::In,
                        quantity: item.quantity,
                    });
                }
            }
            Ok(specs)
        }

        (DocumentDetails::Sale { warehouse_id }, DocumentAction::Confirm) => Ok(document
            .items()
            .iter()
            .filter(|item| !item.free_line)
            .map(|item| MovementSpec {
                product_id: item.product_id,
                warehouse_id: *warehouse_id,
                direction: Direction::Out,
                quantity: item.quantity,
            })
            .collect()),

        _ => Ok(Vec::new()),
    }
}
