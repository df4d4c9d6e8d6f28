//! PostgreSQL implementations of the workflow collaborator traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use stockrecon_core::edit_request::{EditRequest, EditRequestFilter, NewEditRequest};
use stockrecon_core::error::CoreError;
use stockrecon_core::pagination::{Page, PageRequest};
use stockrecon_core::ports::{InventoryLedger, ProductCatalog, StockCountStore};
use stockrecon_core::status::Decision;
use stockrecon_core::stock_count::{
    DailyStats, EntryDecision, EntryFilter, NewStockCount, Product, StockCountEntry,
    SummaryStats,
};
use stockrecon_core::types::DbId;

use crate::error::{into_core_error, unique_violation};
use crate::models::parse_status;
use crate::repositories::{
    EditApproval, EditRequestInsert, EditRequestRepo, InventoryRepo, ProductRepo,
    StockCountRepo,
};
use crate::DbPool;

const ACTIVE_SLOT_CONSTRAINT: &str = "uq_stock_count_entries_active_slot";
const ONE_PENDING_CONSTRAINT: &str = "uq_stock_edit_requests_one_pending";

fn entry_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "StockCountEntry",
        id,
    }
}

fn request_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "EditRequest",
        id,
    }
}

/// The error a review attempt on an already-reviewed row produces.
fn already_reviewed(table: &str, status: &str, decision: Decision) -> CoreError {
    match parse_status(table, status).and_then(|s| s.transition(decision)) {
        Err(err) => err,
        // The row was pending when we looked again, so the conditional update
        // lost a race with a reviewer whose change was since rolled back.
        Ok(_) => CoreError::InvalidState("Review did not apply, retry".to_string()),
    }
}

fn into_page<R, T>(rows: Vec<R>, total: i64, page: PageRequest) -> Result<Page<T>, CoreError>
where
    T: TryFrom<R, Error = CoreError>,
{
    let items = rows
        .into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(items, page, total))
}

/// [`StockCountStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgReconciliationStore {
    pool: DbPool,
}

impl PgReconciliationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockCountStore for PgReconciliationStore {
    async fn insert_entry(&self, input: &NewStockCount) -> Result<StockCountEntry, CoreError> {
        match StockCountRepo::create(&self.pool, input).await {
            Ok(row) => row.try_into(),
            Err(err) if unique_violation(&err) == Some(ACTIVE_SLOT_CONSTRAINT) => {
                Err(CoreError::Conflict(format!(
                    "A stock count for product {} on {} already exists",
                    input.product_id, input.stock_date
                )))
            }
            Err(err) => Err(into_core_error(err)),
        }
    }

    async fn find_entry(&self, id: DbId) -> Result<Option<StockCountEntry>, CoreError> {
        StockCountRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(StockCountEntry::try_from)
            .transpose()
    }

    async fn review_entry(
        &self,
        id: DbId,
        decision: &EntryDecision,
    ) -> Result<StockCountEntry, CoreError> {
        let (admin_notes, rejection_reason) = match decision {
            EntryDecision::Approve { admin_notes, .. } => (admin_notes.as_deref(), None),
            EntryDecision::Reject { reason, .. } => (None, Some(reason.as_str())),
        };

        let reviewed = StockCountRepo::review(
            &self.pool,
            id,
            decision.target_status(),
            decision.reviewer(),
            admin_notes,
            rejection_reason,
        )
        .await
        .map_err(into_core_error)?;

        match reviewed {
            Some(row) => row.try_into(),
            None => {
                let current = StockCountRepo::find_by_id(&self.pool, id)
                    .await
                    .map_err(into_core_error)?
                    .ok_or_else(|| entry_not_found(id))?;
                Err(already_reviewed(
                    "stock_count_entries",
                    &current.status,
                    decision.decision(),
                ))
            }
        }
    }

    async fn list_entries(
        &self,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<StockCountEntry>, CoreError> {
        let (rows, total) = StockCountRepo::list(&self.pool, filter, page)
            .await
            .map_err(into_core_error)?;
        into_page(rows, total, page)
    }

    async fn active_entries_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<StockCountEntry>, CoreError> {
        StockCountRepo::list_active_for_date(&self.pool, date)
            .await
            .map_err(into_core_error)?
            .into_iter()
            .map(StockCountEntry::try_from)
            .collect()
    }

    async fn insert_edit_request(
        &self,
        input: &NewEditRequest,
    ) -> Result<EditRequest, CoreError> {
        let entry_id = input.stock_count_entry_id;
        match EditRequestRepo::create_for_approved_entry(&self.pool, input).await {
            Ok(EditRequestInsert::Created(row)) => row.try_into(),
            Ok(EditRequestInsert::EntryNotFound) => Err(entry_not_found(entry_id)),
            Ok(EditRequestInsert::EntryNotApproved(status)) => Err(CoreError::InvalidState(
                format!("Edits can only be requested for approved entries (status is '{status}')"),
            )),
            Err(err) if unique_violation(&err) == Some(ONE_PENDING_CONSTRAINT) => {
                Err(CoreError::Conflict(format!(
                    "Stock count entry {entry_id} already has a pending edit request"
                )))
            }
            Err(err) => Err(into_core_error(err)),
        }
    }

    async fn find_edit_request(&self, id: DbId) -> Result<Option<EditRequest>, CoreError> {
        EditRequestRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(EditRequest::try_from)
            .transpose()
    }

    async fn approve_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
    ) -> Result<(EditRequest, StockCountEntry), CoreError> {
        let outcome = EditRequestRepo::approve_and_apply(&self.pool, id, reviewer)
            .await
            .map_err(into_core_error)?;

        match outcome {
            EditApproval::Applied(request, entry) => Ok((request.try_into()?, entry.try_into()?)),
            EditApproval::RequestNotFound => Err(request_not_found(id)),
            EditApproval::RequestNotPending(status) => Err(already_reviewed(
                "stock_edit_requests",
                &status,
                Decision::Approve,
            )),
            EditApproval::EntryNotApproved(entry_id) => Err(CoreError::InvalidState(format!(
                "Stock count entry {entry_id} is no longer approved"
            ))),
            EditApproval::EntryChanged(entry_id) => Err(CoreError::InvalidState(format!(
                "Stock count entry {entry_id} changed since the edit was requested"
            ))),
        }
    }

    async fn reject_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
        reason: &str,
    ) -> Result<EditRequest, CoreError> {
        let rejected = EditRequestRepo::reject(&self.pool, id, reviewer, reason)
            .await
            .map_err(into_core_error)?;

        match rejected {
            Some(row) => row.try_into(),
            None => {
                let current = EditRequestRepo::find_by_id(&self.pool, id)
                    .await
                    .map_err(into_core_error)?
                    .ok_or_else(|| request_not_found(id))?;
                Err(already_reviewed(
                    "stock_edit_requests",
                    &current.status,
                    Decision::Reject,
                ))
            }
        }
    }

    async fn list_edit_requests(
        &self,
        filter: &EditRequestFilter,
        page: PageRequest,
    ) -> Result<Page<EditRequest>, CoreError> {
        let (rows, total) = EditRequestRepo::list(&self.pool, filter, page)
            .await
            .map_err(into_core_error)?;
        into_page(rows, total, page)
    }

    async fn summary_stats(&self, today: NaiveDate) -> Result<SummaryStats, CoreError> {
        let counts = StockCountRepo::daily_counts(&self.pool, today)
            .await
            .map_err(into_core_error)?;
        let pending_edit_requests = EditRequestRepo::count_pending(&self.pool)
            .await
            .map_err(into_core_error)?;

        Ok(SummaryStats {
            today: DailyStats {
                submitted: counts.submitted,
                pending: counts.pending,
                approved: counts.approved,
            },
            pending_edit_requests,
        })
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(into_core_error)
    }
}

/// [`InventoryLedger`] and [`ProductCatalog`] backed by the `products` and
/// `inventory_movements` tables.
#[derive(Clone)]
pub struct PgInventory {
    pool: DbPool,
}

impl PgInventory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryLedger for PgInventory {
    async fn system_packs(&self, product_id: DbId, date: NaiveDate) -> Result<i64, CoreError> {
        InventoryRepo::system_packs(&self.pool, product_id, date)
            .await
            .map_err(into_core_error)
    }
}

#[async_trait]
impl ProductCatalog for PgInventory {
    async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        let rows = ProductRepo::list_active(&self.pool)
            .await
            .map_err(into_core_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        let row = ProductRepo::find_active(&self.pool, id)
            .await
            .map_err(into_core_error)?;
        Ok(row.map(Product::from))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_already_reviewed_reports_current_status() {
        assert_matches!(
            already_reviewed("stock_count_entries", "approved", Decision::Reject),
            CoreError::InvalidState(msg) if msg.contains("approved")
        );
    }

    #[test]
    fn test_already_reviewed_with_corrupt_status_is_internal() {
        assert_matches!(
            already_reviewed("stock_edit_requests", "archived", Decision::Approve),
            CoreError::Internal(_)
        );
    }
}
