//! The reconciliation workflow engine.
//!
//! [`ReconciliationService`] enforces the submit -> approve/reject lifecycle
//! of stock count entries and the secondary lifecycle of post-approval edit
//! requests. It validates input and checks capabilities, then hands each
//! mutation to the [`StockCountStore`] as one atomic unit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use validator::Validate;

use crate::edit_request::{
    validate_edit_reason, EditRequest, EditRequestFilter, NewEditRequest, RequestEdit,
};
use crate::error::CoreError;
use crate::pagination::{Page, PageRequest};
use crate::ports::{InventoryLedger, ProductCatalog, StockCountStore};
use crate::roles::Actor;
use crate::status::ReviewStatus;
use crate::stock_count::{
    normalize_optional_text, validate_admin_notes, validate_rejection_reason,
    validate_stock_date, ComparisonRow, EntryDecision, EntryFilter, NewStockCount,
    StockCountEntry, SubmitStockCount, SummaryStats,
};
use crate::types::DbId;

pub struct ReconciliationService {
    store: Arc<dyn StockCountStore>,
    inventory: Arc<dyn InventoryLedger>,
    catalog: Arc<dyn ProductCatalog>,
}

impl ReconciliationService {
    pub fn new(
        store: Arc<dyn StockCountStore>,
        inventory: Arc<dyn InventoryLedger>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            store,
            inventory,
            catalog,
        }
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        self.store.health_check().await
    }

    /* ----------------------------------------------------------------------
    Stock count entries
    ---------------------------------------------------------------------- */

    /// Submit a manual count for a product on a date.
    ///
    /// `today` bounds the stock date; counts cannot be submitted for future
    /// dates.
    pub async fn submit(
        &self,
        actor: &Actor,
        input: SubmitStockCount,
        today: NaiveDate,
    ) -> Result<StockCountEntry, CoreError> {
        input.validate()?;
        validate_stock_date(input.stock_date, today)?;

        self.catalog
            .find_product(input.product_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id: input.product_id,
            })?;

        let system_packs = self
            .inventory
            .system_packs(input.product_id, input.stock_date)
            .await?;

        let new_entry = NewStockCount {
            product_id: input.product_id,
            stock_date: input.stock_date,
            manual_packs: input.manual_packs,
            system_packs,
            notes: normalize_optional_text(input.notes),
            submitted_by: actor.user_id,
        };

        self.store.insert_entry(&new_entry).await
    }

    /// Approve a pending entry. Counts and variance are left as submitted.
    pub async fn approve(
        &self,
        actor: &Actor,
        entry_id: DbId,
        admin_notes: Option<String>,
    ) -> Result<StockCountEntry, CoreError> {
        require_approver(actor)?;
        let admin_notes = normalize_optional_text(admin_notes);
        validate_admin_notes(admin_notes.as_deref())?;

        let decision = EntryDecision::Approve {
            reviewer: actor.user_id,
            admin_notes,
        };
        self.store.review_entry(entry_id, &decision).await
    }

    /// Reject a pending entry. A non-blank reason is required.
    pub async fn reject(
        &self,
        actor: &Actor,
        entry_id: DbId,
        rejection_reason: &str,
    ) -> Result<StockCountEntry, CoreError> {
        require_approver(actor)?;
        validate_rejection_reason(rejection_reason)?;

        let decision = EntryDecision::Reject {
            reviewer: actor.user_id,
            reason: rejection_reason.trim().to_string(),
        };
        self.store.review_entry(entry_id, &decision).await
    }

    pub async fn get_entry(&self, entry_id: DbId) -> Result<StockCountEntry, CoreError> {
        self.store
            .find_entry(entry_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "StockCountEntry",
                id: entry_id,
            })
    }

    pub async fn list_entries(
        &self,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<StockCountEntry>, CoreError> {
        self.store.list_entries(filter, page).await
    }

    /// Join every catalog product with its active entry and system count
    /// for `date`. Products without a submission have no manual count.
    pub async fn compare_for_date(&self, date: NaiveDate) -> Result<Vec<ComparisonRow>, CoreError> {
        let products = self.catalog.list_products().await?;
        let entries: HashMap<DbId, StockCountEntry> = self
            .store
            .active_entries_for_date(date)
            .await?
            .into_iter()
            .map(|e| (e.product_id, e))
            .collect();

        let mut rows = Vec::with_capacity(products.len());
        for product in products {
            let entry = entries.get(&product.id);
            // A submitted entry carries the system count its variance was
            // computed against; products without one read the ledger.
            let system_packs = match entry {
                Some(e) => e.system_packs,
                None => self.inventory.system_packs(product.id, date).await?,
            };
            rows.push(ComparisonRow {
                product_id: product.id,
                product_name: product.name,
                product_no: product.product_no,
                entry_id: entry.map(|e| e.id),
                manual_packs: entry.map(|e| e.manual_packs),
                system_packs,
                variance_packs: entry.map(|e| e.variance_packs),
                status: entry.map(|e| e.status),
            });
        }
        Ok(rows)
    }

    pub async fn summary_stats(&self, today: NaiveDate) -> Result<SummaryStats, CoreError> {
        self.store.summary_stats(today).await
    }

    /* ----------------------------------------------------------------------
    Edit requests
    ---------------------------------------------------------------------- */

    /// Propose a new manual count for an approved entry.
    ///
    /// Only the entry's submitter or an approver may request an edit.
    pub async fn request_edit(
        &self,
        actor: &Actor,
        entry_id: DbId,
        input: RequestEdit,
    ) -> Result<EditRequest, CoreError> {
        input.validate()?;
        validate_edit_reason(&input.edit_reason)?;

        let entry = self.get_entry(entry_id).await?;
        if entry.submitted_by != actor.user_id && !actor.is_approver() {
            return Err(CoreError::Forbidden(
                "Only the submitter or an approver can request an edit".into(),
            ));
        }
        if entry.status != ReviewStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "Edits can only be requested for approved entries (status is '{}')",
                entry.status
            )));
        }

        let new_request = NewEditRequest {
            stock_count_entry_id: entry_id,
            new_manual_packs: input.new_manual_packs,
            edit_reason: input.edit_reason.trim().to_string(),
            requested_by: actor.user_id,
        };
        // The store re-checks status and pending requests atomically.
        self.store.insert_edit_request(&new_request).await
    }

    /// Approve a pending edit request, applying the new count to its entry.
    pub async fn approve_edit(
        &self,
        actor: &Actor,
        request_id: DbId,
    ) -> Result<(EditRequest, StockCountEntry), CoreError> {
        require_approver(actor)?;
        self.store
            .approve_edit_request(request_id, actor.user_id)
            .await
    }

    /// Reject a pending edit request. The entry keeps its current count.
    pub async fn reject_edit(
        &self,
        actor: &Actor,
        request_id: DbId,
        reason: &str,
    ) -> Result<EditRequest, CoreError> {
        require_approver(actor)?;
        validate_rejection_reason(reason)?;
        self.store
            .reject_edit_request(request_id, actor.user_id, reason.trim())
            .await
    }

    pub async fn get_edit_request(&self, request_id: DbId) -> Result<EditRequest, CoreError> {
        self.store
            .find_edit_request(request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "EditRequest",
                id: request_id,
            })
    }

    pub async fn list_edit_requests(
        &self,
        filter: &EditRequestFilter,
        page: PageRequest,
    ) -> Result<Page<EditRequest>, CoreError> {
        self.store.list_edit_requests(filter, page).await
    }
}

fn require_approver(actor: &Actor) -> Result<(), CoreError> {
    if actor.is_approver() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Approver role required".into()))
    }
}
