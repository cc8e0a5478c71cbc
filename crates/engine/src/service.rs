//! The document engine: one facade over documents, stock, and settlements.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use tracing::info;

use docflow_core::{
    DocumentId, DomainError, DomainResult, Percentage, ProductId, SettlementId, TechnicianId,
    TenantId, UserId, WarehouseId, WorkOrderId,
};
use docflow_documents::{
    Document, DocumentAction, DocumentDetails, DocumentItem, DocumentKind, ReceiptLine,
    ReturnDestination, TransferReconciliation, effects_for, reconcile, reverses_prior_movements,
};
use docflow_ledger::{MovementSpec, StockLedger, StockMovement};
use docflow_settlement::{CommissionSettlement, SettlementEngine, SettlementPreview, WorkOrder};

use crate::query::{DocumentFilter, Page};

#[derive(Debug, Default)]
struct DocumentStore {
    documents: HashMap<DocumentId, Document>,
    sequences: HashMap<(TenantId, DocumentKind), u64>,
}

/// Orchestration facade. Each operation is a single atomic unit of work: the
/// transition check, the ledger batch, and the status commit happen under one
/// document-store write lock, so callers observe either full success or an
/// error with no partial state.
#[derive(Debug, Default)]
pub struct DocumentEngine {
    store: RwLock<DocumentStore>,
    ledger: StockLedger,
    settlements: SettlementEngine,
}

fn lock_poisoned() -> DomainError {
    DomainError::conflict("document store lock poisoned")
}

impl DocumentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // --- documents -------------------------------------------------------

    /// Create a document in its kind's initial status, numbered per
    /// (tenant, kind).
    pub fn create_document(
        &self,
        tenant_id: TenantId,
        details: DocumentDetails,
        items: Vec<DocumentItem>,
    ) -> DomainResult<Document> {
        let kind = details.kind();
        let mut store = self.store.write().map_err(|_| lock_poisoned())?;

        let sequence = store.sequences.entry((tenant_id, kind)).or_insert(0);
        *sequence += 1;
        let number = format!("{}-{:06}", kind.number_prefix(), *sequence);

        let mut document = Document::new(DocumentId::new(), tenant_id, number, details, Utc::now());
        document.replace_items(items)?;

        info!(
            tenant = %tenant_id,
            number = document.number(),
            kind = %kind,
            "document created"
        );
        store.documents.insert(document.id(), document.clone());
        Ok(document)
    }

    /// Update header details and/or items. Only legal while the document is
    /// in its editable (initial) status; totals are derived, never accepted.
    pub fn update_document(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
        details: Option<DocumentDetails>,
        items: Option<Vec<DocumentItem>>,
    ) -> DomainResult<Document> {
        let mut store = self.store.write().map_err(|_| lock_poisoned())?;
        let current = store
            .documents
            .get(&document_id)
            .ok_or(DomainError::NotFound)?;
        current.ensure_tenant(tenant_id)?;

        let mut working = current.clone();
        if let Some(details) = details {
            working.replace_details(details)?;
        }
        if let Some(items) = items {
            working.replace_items(items)?;
        }

        store.documents.insert(document_id, working.clone());
        Ok(working)
    }

    pub fn get_document(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> DomainResult<Document> {
        let store = self.store.read().map_err(|_| lock_poisoned())?;
        let document = store
            .documents
            .get(&document_id)
            .ok_or(DomainError::NotFound)?;
        document.ensure_tenant(tenant_id)?;
        Ok(document.clone())
    }

    /// List a tenant's documents, filtered and paginated, newest first.
    pub fn list_documents(
        &self,
        tenant_id: TenantId,
        filter: &DocumentFilter,
    ) -> DomainResult<Page<Document>> {
        let store = self.store.read().map_err(|_| lock_poisoned())?;
        let mut matched: Vec<Document> = store
            .documents
            .values()
            .filter(|d| d.tenant_id() == tenant_id && filter.matches(d))
            .cloned()
            .collect();
        drop(store);
        matched.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.number().cmp(a.number()))
        });
        Ok(Page::paginate(matched, filter.page, filter.per_page()))
    }

    // --- transitions -----------------------------------------------------

    /// Confirm a draft adjustment or sale, applying its stock movements.
    pub fn confirm(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        allow_backorder: bool,
    ) -> DomainResult<Document> {
        self.apply_transition(
            tenant_id,
            actor,
            document_id,
            DocumentAction::Confirm,
            allow_backorder,
            |d| d.ensure_finalizable(),
        )
    }

    /// Cancel a document. A confirmed sale is reversed by issuing the exact
    /// offsets of its previously recorded movements.
    pub fn cancel(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
    ) -> DomainResult<Document> {
        self.apply_transition(tenant_id, actor, document_id, DocumentAction::Cancel, false, |_| {
            Ok(())
        })
    }

    /// Delete a draft adjustment (terminal `removed` status; the document is
    /// hidden from listings but keeps its audit trail).
    pub fn delete(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
    ) -> DomainResult<Document> {
        self.apply_transition(tenant_id, actor, document_id, DocumentAction::Delete, false, |_| {
            Ok(())
        })
    }

    /// Send a transfer: declared quantities are snapshotted and the source
    /// warehouse is reduced immediately — goods are in flight.
    pub fn send_transfer(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        allow_backorder: bool,
    ) -> DomainResult<Document> {
        self.apply_transition(
            tenant_id,
            actor,
            document_id,
            DocumentAction::Send,
            allow_backorder,
            |d| {
                d.ensure_finalizable()?;
                d.record_send()
            },
        )
    }

    /// Receive a transfer: destination stock grows by what actually arrived,
    /// and the declared-vs-actual reconciliation is returned. Discrepancies
    /// never block completion.
    pub fn receive_transfer(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        receipts: &[ReceiptLine],
    ) -> DomainResult<(Document, TransferReconciliation)> {
        let document = self.apply_transition(
            tenant_id,
            actor,
            document_id,
            DocumentAction::Receive,
            false,
            |d| d.record_receipt(receipts),
        )?;
        let reconciliation = reconcile(document.items())?;
        if reconciliation.has_discrepancy {
            info!(
                number = document.number(),
                total_difference = reconciliation.total_difference,
                "transfer received with discrepancy"
            );
        }
        Ok((document, reconciliation))
    }

    /// Approve an internal consumption, consuming stock.
    pub fn approve_consumption(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        allow_backorder: bool,
    ) -> DomainResult<Document> {
        self.apply_transition(
            tenant_id,
            actor,
            document_id,
            DocumentAction::Approve,
            allow_backorder,
            |d| d.ensure_finalizable(),
        )
    }

    /// Approve a customer return with a destination per item; only
    /// `inventory` lines touch stock.
    pub fn approve_return(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        destinations: &[ReturnDestination],
    ) -> DomainResult<Document> {
        self.apply_transition(
            tenant_id,
            actor,
            document_id,
            DocumentAction::Approve,
            false,
            |d| {
                d.ensure_finalizable()?;
                d.assign_destinations(destinations)
            },
        )
    }

    /// Reject a pending consumption or return. The reason is required.
    pub fn reject(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        reason: &str,
    ) -> DomainResult<Document> {
        self.apply_transition(tenant_id, actor, document_id, DocumentAction::Reject, false, |d| {
            d.set_rejection_reason(reason)
        })
    }

    /// Deliver a confirmed (pending) sale. Stock already moved at confirm.
    pub fn deliver_sale(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
    ) -> DomainResult<Document> {
        self.apply_transition(tenant_id, actor, document_id, DocumentAction::Deliver, false, |_| {
            Ok(())
        })
    }

    /// Validate-then-commit pipeline shared by every verb.
    ///
    /// Rejections happen in order: not found / tenant → transition table →
    /// variant validation (`prepare`) → ledger batch. Nothing before the
    /// final commit mutates the stored document, and the table check runs
    /// before the ledger, so stock movements apply at most once per
    /// document+transition pair.
    fn apply_transition(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        document_id: DocumentId,
        action: DocumentAction,
        allow_backorder: bool,
        prepare: impl FnOnce(&mut Document) -> DomainResult<()>,
    ) -> DomainResult<Document> {
        let mut store = self.store.write().map_err(|_| lock_poisoned())?;
        let current = store
            .documents
            .get(&document_id)
            .ok_or(DomainError::NotFound)?;
        current.ensure_tenant(tenant_id)?;

        let next = current.next_status(action)?;

        let mut working = current.clone();
        prepare(&mut working)?;

        let specs: Vec<MovementSpec> = if reverses_prior_movements(working.kind(), action) {
            self.ledger
                .movements_for_document(tenant_id, document_id)?
                .iter()
                .map(StockMovement::offsetting_spec)
                .collect()
        } else {
            effects_for(&working, action)?
        };

        // Offsets must always land exactly, so reversal ignores the
        // backorder gate.
        let allow = allow_backorder || reverses_prior_movements(working.kind(), action);
        let movements = self
            .ledger
            .apply_batch(tenant_id, document_id, &specs, allow, Utc::now())?;

        working.commit_status(next);
        working.record_actor(actor);
        info!(
            tenant = %tenant_id,
            actor = %actor,
            number = working.number(),
            action = %action,
            status = %working.status(),
            movements = movements.len(),
            "document transitioned"
        );
        store.documents.insert(document_id, working.clone());
        Ok(working)
    }

    // --- stock -----------------------------------------------------------

    pub fn current_stock(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<i64> {
        self.ledger.current_stock(tenant_id, product_id, warehouse_id)
    }

    pub fn document_movements(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> DomainResult<Vec<StockMovement>> {
        self.ledger.movements_for_document(tenant_id, document_id)
    }

    pub fn product_movements(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> DomainResult<Vec<StockMovement>> {
        self.ledger.movements_for_product(tenant_id, product_id)
    }

    // --- settlements -----------------------------------------------------

    pub fn register_work_order(&self, order: WorkOrder) -> DomainResult<()> {
        self.settlements.register_order(order)
    }

    pub fn work_order(
        &self,
        tenant_id: TenantId,
        id: WorkOrderId,
    ) -> DomainResult<Option<WorkOrder>> {
        self.settlements.order(tenant_id, id)
    }

    /// Pure read: what settling the period would pay.
    pub fn preview_settlement(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        date_from: NaiveDate,
        date_to: NaiveDate,
        commission_percentage: Percentage,
    ) -> DomainResult<SettlementPreview> {
        self.settlements
            .preview(tenant_id, technician_id, date_from, date_to, commission_percentage)
    }

    /// Commit a settlement over the period, permanently consuming the
    /// selected work orders.
    pub fn create_settlement(
        &self,
        tenant_id: TenantId,
        technician_id: TechnicianId,
        date_from: NaiveDate,
        date_to: NaiveDate,
        commission_percentage: Percentage,
    ) -> DomainResult<CommissionSettlement> {
        let settlement = self.settlements.create(
            tenant_id,
            technician_id,
            date_from,
            date_to,
            commission_percentage,
            Utc::now(),
        )?;
        info!(
            tenant = %tenant_id,
            number = %settlement.number,
            orders = settlement.order_ids.len(),
            base = %settlement.base_amount,
            commission = %settlement.commission_amount,
            "settlement created"
        );
        Ok(settlement)
    }

    pub fn settlements(&self, tenant_id: TenantId) -> DomainResult<Vec<CommissionSettlement>> {
        self.settlements.settlements(tenant_id)
    }

    pub fn settlement(
        &self,
        tenant_id: TenantId,
        id: SettlementId,
    ) -> DomainResult<Option<CommissionSettlement>> {
        self.settlements.settlement(tenant_id, id)
    }
}
