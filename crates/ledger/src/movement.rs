//! Movement records: immutable facts about one quantity change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docflow_core::{DocumentId, MovementId, ProductId, TenantId, WarehouseId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// The opposite direction, used when issuing exact offsetting movements.
    pub fn reversed(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// Signed delta this direction applies to stock for `quantity` units.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            Direction::In => quantity,
            Direction::Out => -quantity,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Direction::In => "in",
            Direction::Out => "out",
        };
        f.write_str(s)
    }
}

/// A requested movement, before it is applied against current stock.
///
/// Document variants derive these from their items on a transition; the
/// ledger turns each into a `StockMovement` with the running totals filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSpec {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub direction: Direction,
    pub quantity: i64,
}

impl MovementSpec {
    /// Exact offset of this spec: same product/warehouse/quantity, direction
    /// flipped. No recomputation from current state.
    pub fn reversed(self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self
        }
    }
}

/// One immutable ledger entry. Corrections happen by appending offsetting
/// movements, never by editing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub direction: Direction,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub source_document_id: DocumentId,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Spec that would exactly undo this movement.
    pub fn offsetting_spec(&self) -> MovementSpec {
        MovementSpec {
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            direction: self.direction.reversed(),
            quantity: self.quantity,
        }
    }
}
