//! Traits for the collaborators the reconciliation workflow depends on.
//!
//! - [`InventoryLedger`] -- authoritative system pack counts.
//! - [`ProductCatalog`] -- the set of products that can be counted.
//! - [`StockCountStore`] -- persistence for entries and edit requests.
//!
//! Implementations live in the `db` crate (PostgreSQL) and in
//! [`crate::memory`] (in-process, for tests and local runs).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::edit_request::{EditRequest, EditRequestFilter, NewEditRequest};
use crate::error::CoreError;
use crate::pagination::{Page, PageRequest};
use crate::stock_count::{
    EntryDecision, EntryFilter, NewStockCount, Product, StockCountEntry, SummaryStats,
};
use crate::types::DbId;

/// Inventory accounting: pack counts derived from recorded stock movements.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// System-computed pack count for a product as of the end of `date`.
    async fn system_packs(&self, product_id: DbId, date: NaiveDate) -> Result<i64, CoreError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All countable products, ordered by product number.
    async fn list_products(&self) -> Result<Vec<Product>, CoreError>;

    async fn find_product(&self, id: DbId) -> Result<Option<Product>, CoreError>;
}

/// Persistence for stock count entries and their edit requests.
///
/// This is the only write path for entry status, counts and variance.
/// Every method is a single atomic unit with respect to concurrent callers.
#[async_trait]
pub trait StockCountStore: Send + Sync {
    /// Insert a pending entry.
    ///
    /// Fails with [`CoreError::Conflict`] if a pending or approved entry
    /// already exists for the same product and date. The check and the insert
    /// are one atomic step.
    async fn insert_entry(&self, input: &NewStockCount) -> Result<StockCountEntry, CoreError>;

    async fn find_entry(&self, id: DbId) -> Result<Option<StockCountEntry>, CoreError>;

    /// Move a pending entry to approved or rejected.
    ///
    /// Fails with [`CoreError::NotFound`] for an unknown id and
    /// [`CoreError::InvalidState`] when the entry is no longer pending.
    async fn review_entry(
        &self,
        id: DbId,
        decision: &EntryDecision,
    ) -> Result<StockCountEntry, CoreError>;

    /// List entries matching `filter`, newest first.
    async fn list_entries(
        &self,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<StockCountEntry>, CoreError>;

    /// Pending and approved entries for a date (at most one per product).
    async fn active_entries_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<StockCountEntry>, CoreError>;

    /// Insert a pending edit request, snapshotting the entry's manual count.
    ///
    /// Fails with [`CoreError::NotFound`] for an unknown entry,
    /// [`CoreError::InvalidState`] unless the entry is approved, and
    /// [`CoreError::Conflict`] if the entry already has a pending request.
    async fn insert_edit_request(&self, input: &NewEditRequest)
        -> Result<EditRequest, CoreError>;

    async fn find_edit_request(&self, id: DbId) -> Result<Option<EditRequest>, CoreError>;

    /// Approve a pending edit request and apply it to its entry.
    ///
    /// The request transition and the entry update commit together or not
    /// at all. Fails with [`CoreError::InvalidState`] if the request is not
    /// pending, or if the entry is no longer approved or its manual count no
    /// longer matches the request's snapshot.
    async fn approve_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
    ) -> Result<(EditRequest, StockCountEntry), CoreError>;

    /// Reject a pending edit request. The entry is not touched.
    async fn reject_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
        reason: &str,
    ) -> Result<EditRequest, CoreError>;

    /// List edit requests matching `filter`, newest first.
    async fn list_edit_requests(
        &self,
        filter: &EditRequestFilter,
        page: PageRequest,
    ) -> Result<Page<EditRequest>, CoreError>;

    async fn summary_stats(&self, today: NaiveDate) -> Result<SummaryStats, CoreError>;

    async fn health_check(&self) -> Result<(), CoreError>;
}
