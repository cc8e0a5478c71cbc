//! In-memory stock ledger: append-only log + current-quantity projection.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use docflow_core::{DocumentId, DomainError, DomainResult, MovementId, ProductId, TenantId, WarehouseId};

use crate::movement::{Direction, MovementSpec, StockMovement};

/// Tenant-scoped projection key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct StockKey {
    tenant_id: TenantId,
    product_id: ProductId,
    warehouse_id: WarehouseId,
}

#[derive(Debug, Default)]
struct LedgerState {
    movements: Vec<StockMovement>,
    stock: HashMap<StockKey, i64>,
}

/// Append-only stock ledger.
///
/// All state lives behind one `RwLock`; a batch is validated and appended
/// under a single write-lock acquisition, so two concurrent confirmations
/// against the same `(product, warehouse)` pair never interleave their
/// read-modify-write of current stock.
#[derive(Debug, Default)]
pub struct StockLedger {
    state: RwLock<LedgerState>,
}

fn lock_poisoned() -> DomainError {
    DomainError::conflict("stock ledger lock poisoned")
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of movements for one source document, all-or-nothing.
    ///
    /// Every spec is validated (positive quantity; for `out`, resulting stock
    /// non-negative unless `allow_backorder`) against the running projection
    /// *including earlier lines of the same batch* before anything is
    /// appended. On any failure nothing is recorded.
    pub fn apply_batch(
        &self,
        tenant_id: TenantId,
        source_document_id: DocumentId,
        specs: &[MovementSpec],
        allow_backorder: bool,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<StockMovement>> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        for spec in specs {
            if spec.quantity <= 0 {
                return Err(DomainError::validation("movement quantity must be positive"));
            }
        }

        let mut state = self.state.write().map_err(|_| lock_poisoned())?;

        // Dry run over a scratch projection first.
        let mut projected: HashMap<StockKey, i64> = HashMap::new();
        let mut applied: Vec<StockMovement> = Vec::with_capacity(specs.len());

        for spec in specs {
            let key = StockKey {
                tenant_id,
                product_id: spec.product_id,
                warehouse_id: spec.warehouse_id,
            };
            let previous = *projected
                .get(&key)
                .unwrap_or_else(|| state.stock.get(&key).unwrap_or(&0));
            let new = previous + spec.direction.signed(spec.quantity);

            if spec.direction == Direction::Out && new < 0 && !allow_backorder {
                return Err(DomainError::InsufficientStock {
                    product_id: spec.product_id.to_string(),
                    warehouse_id: spec.warehouse_id.to_string(),
                    available: previous,
                    requested: spec.quantity,
                });
            }

            projected.insert(key, new);
            applied.push(StockMovement {
                id: MovementId::new(),
                tenant_id,
                product_id: spec.product_id,
                warehouse_id: spec.warehouse_id,
                direction: spec.direction,
                quantity: spec.quantity,
                previous_stock: previous,
                new_stock: new,
                source_document_id,
                created_at: occurred_at,
            });
        }

        // Commit: projection and log advance together.
        for (key, value) in projected {
            state.stock.insert(key, value);
        }
        state.movements.extend(applied.iter().cloned());

        Ok(applied)
    }

    /// Current stock for a `(product, warehouse)` pair.
    ///
    /// A poisoned lock surfaces as an error; reads never masquerade as
    /// zero stock.
    pub fn current_stock(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<i64> {
        let key = StockKey {
            tenant_id,
            product_id,
            warehouse_id,
        };
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(*state.stock.get(&key).unwrap_or(&0))
    }

    /// All movements caused by one document, in application order.
    pub fn movements_for_document(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> DomainResult<Vec<StockMovement>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .movements
            .iter()
            .filter(|m| m.tenant_id == tenant_id && m.source_document_id == document_id)
            .cloned()
            .collect())
    }

    /// Movement history for one product across all warehouses of a tenant.
    pub fn movements_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> DomainResult<Vec<StockMovement>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .movements
            .iter()
            .filter(|m| m.tenant_id == tenant_id && m.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::Direction;
    use proptest::prelude::*;

    fn spec(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        direction: Direction,
        quantity: i64,
    ) -> MovementSpec {
        MovementSpec {
            product_id,
            warehouse_id,
            direction,
            quantity,
        }
    }

    #[test]
    fn inbound_batch_advances_running_totals() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();
        let doc = DocumentId::new();

        let applied = ledger
            .apply_batch(
                tenant,
                doc,
                &[
                    spec(product, warehouse, Direction::In, 5),
                    spec(product, warehouse, Direction::In, 3),
                ],
                false,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].previous_stock, 0);
        assert_eq!(applied[0].new_stock, 5);
        assert_eq!(applied[1].previous_stock, 5);
        assert_eq!(applied[1].new_stock, 8);
        assert_eq!(ledger.current_stock(tenant, product, warehouse).unwrap(), 8);
    }

    #[test]
    fn outbound_without_stock_rejects_whole_batch() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product_a = ProductId::new();
        let product_b = ProductId::new();
        let warehouse = WarehouseId::new();

        ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[spec(product_a, warehouse, Direction::In, 10)],
                false,
                Utc::now(),
            )
            .unwrap();

        // First line would succeed, second line fails: nothing may be applied.
        let err = ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[
                    spec(product_a, warehouse, Direction::Out, 4),
                    spec(product_b, warehouse, Direction::Out, 1),
                ],
                false,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(ledger.current_stock(tenant, product_a, warehouse).unwrap(), 10);
        assert_eq!(ledger.current_stock(tenant, product_b, warehouse).unwrap(), 0);
    }

    #[test]
    fn backorder_allows_negative_stock() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();

        let applied = ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[spec(product, warehouse, Direction::Out, 2)],
                true,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(applied[0].new_stock, -2);
        assert_eq!(ledger.current_stock(tenant, product, warehouse).unwrap(), -2);
    }

    #[test]
    fn non_positive_quantity_is_rejected_before_locking_state() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let err = ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[spec(ProductId::new(), WarehouseId::new(), Direction::In, 0)],
                false,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn tenants_are_isolated() {
        let ledger = StockLedger::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        ledger
            .apply_batch(
                tenant_a,
                DocumentId::new(),
                &[spec(product, warehouse, Direction::In, 7)],
                false,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ledger.current_stock(tenant_a, product, warehouse).unwrap(), 7);
        assert_eq!(ledger.current_stock(tenant_b, product, warehouse).unwrap(), 0);
    }

    #[test]
    fn movements_for_document_returns_exactly_that_documents_entries() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();
        let doc_a = DocumentId::new();
        let doc_b = DocumentId::new();

        ledger
            .apply_batch(
                tenant,
                doc_a,
                &[spec(product, warehouse, Direction::In, 4)],
                false,
                Utc::now(),
            )
            .unwrap();
        ledger
            .apply_batch(
                tenant,
                doc_b,
                &[spec(product, warehouse, Direction::Out, 1)],
                false,
                Utc::now(),
            )
            .unwrap();

        let for_a = ledger.movements_for_document(tenant, doc_a).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].quantity, 4);
        assert_eq!(for_a[0].direction, Direction::In);
    }

    #[test]
    fn concurrent_outbound_batches_never_oversell() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();

        ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[spec(product, warehouse, Direction::In, 10)],
                false,
                Utc::now(),
            )
            .unwrap();

        // Twenty threads race to take one unit each; only ten can win.
        let ledger = &ledger;
        let successes = std::thread::scope(|s| {
            let handles: Vec<_> = (0..20)
                .map(|_| {
                    s.spawn(move || {
                        ledger.apply_batch(
                            tenant,
                            DocumentId::new(),
                            &[spec(product, warehouse, Direction::Out, 1)],
                            false,
                            Utc::now(),
                        )
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|r| r.is_ok())
                .count()
        });

        assert_eq!(successes, 10);
        assert_eq!(ledger.current_stock(tenant, product, warehouse).unwrap(), 0);
        assert_eq!(ledger.movements_for_product(tenant, product).unwrap().len(), 11);
    }

    #[test]
    fn poisoned_lock_surfaces_as_an_error_not_zero_stock() {
        let ledger = StockLedger::new();
        let tenant = TenantId::new();
        let product = ProductId::new();
        let warehouse = WarehouseId::new();

        ledger
            .apply_batch(
                tenant,
                DocumentId::new(),
                &[spec(product, warehouse, Direction::In, 5)],
                false,
                Utc::now(),
            )
            .unwrap();

        let ledger = &ledger;
        std::thread::scope(|s| {
            let _ = s
                .spawn(move || {
                    let _guard = ledger.state.write().unwrap();
                    panic!("poison the ledger lock");
                })
                .join();
        });

        let err = ledger.current_stock(tenant, product, warehouse).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(ledger.movements_for_product(tenant, product).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of inbound/outbound batches (with
        /// backorder allowed so nothing is rejected), the projection equals
        /// the signed sum of all recorded movements.
        #[test]
        fn projection_equals_sum_of_movements(
            deltas in prop::collection::vec((any::<bool>(), 1i64..1_000i64), 1..40)
        ) {
            let ledger = StockLedger::new();
            let tenant = TenantId::new();
            let product = ProductId::new();
            let warehouse = WarehouseId::new();

            for (inbound, qty) in &deltas {
                let direction = if *inbound { Direction::In } else { Direction::Out };
                ledger
                    .apply_batch(
                        tenant,
                        DocumentId::new(),
                        &[MovementSpec { product_id: product, warehouse_id: warehouse, direction, quantity: *qty }],
                        true,
                        Utc::now(),
                    )
                    .unwrap();
            }

            let from_log: i64 = ledger
                .movements_for_product(tenant, product)
                .unwrap()
                .iter()
                .map(|m| m.direction.signed(m.quantity))
                .sum();

            prop_assert_eq!(ledger.current_stock(tenant, product, warehouse).unwrap(), from_log);
        }
    }
}
