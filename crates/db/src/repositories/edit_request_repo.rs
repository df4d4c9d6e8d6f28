//! Repository for the `stock_edit_requests` table.
//!
//! Creating and approving a request both touch the parent entry, so those
//! two operations run in a transaction that locks the rows involved with
//! `SELECT ... FOR UPDATE`.

use sqlx::PgPool;
use stockrecon_core::edit_request::{EditRequestFilter, NewEditRequest};
use stockrecon_core::pagination::PageRequest;
use stockrecon_core::status::{ReviewStatus, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use stockrecon_core::types::DbId;

use crate::models::edit_request::EditRequestRow;
use crate::models::stock_count::StockCountRow;
use crate::repositories::stock_count_repo::COLUMNS as ENTRY_COLUMNS;

/// Column list for stock_edit_requests queries.
const COLUMNS: &str = "id, stock_count_entry_id, old_manual_packs, new_manual_packs, \
    edit_reason, status, requested_by, reviewed_by, rejection_reason, created_at, \
    reviewed_at, updated_at, version";

/// Shared WHERE clause for filtered listing. Binds `$1..$3`.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR status = $1) \
    AND ($2::bigint IS NULL OR stock_count_entry_id = $2) \
    AND ($3::bigint IS NULL OR requested_by = $3)";

/// Result of [`EditRequestRepo::create_for_approved_entry`].
#[derive(Debug)]
pub enum EditRequestInsert {
    Created(EditRequestRow),
    EntryNotFound,
    /// The entry exists but is not approved; carries its status.
    EntryNotApproved(String),
}

/// Result of [`EditRequestRepo::approve_and_apply`].
#[derive(Debug)]
pub enum EditApproval {
    Applied(EditRequestRow, StockCountRow),
    RequestNotFound,
    /// The request was already reviewed; carries its status.
    RequestNotPending(String),
    EntryNotApproved(DbId),
    /// The entry's manual count no longer matches the request snapshot.
    EntryChanged(DbId),
}

pub struct EditRequestRepo;

impl EditRequestRepo {
    /// Insert a pending request for an approved entry.
    ///
    /// The entry row is locked while its status is checked and its manual
    /// count is snapshotted. A second pending request for the same entry is
    /// rejected by `uq_stock_edit_requests_one_pending`.
    pub async fn create_for_approved_entry(
        pool: &PgPool,
        input: &NewEditRequest,
    ) -> Result<EditRequestInsert, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let entry: Option<(String, i64)> = sqlx::query_as(
            "SELECT status, manual_packs FROM stock_count_entries WHERE id = $1 FOR UPDATE",
        )
        .bind(input.stock_count_entry_id)
        .fetch_optional(&mut *tx)
        .await?;

        let old_manual_packs = match entry {
            None => return Ok(EditRequestInsert::EntryNotFound),
            Some((status, _)) if status != STATUS_APPROVED => {
                return Ok(EditRequestInsert::EntryNotApproved(status))
            }
            Some((_, manual_packs)) => manual_packs,
        };

        let query = format!(
            "INSERT INTO stock_edit_requests
                (stock_count_entry_id, old_manual_packs, new_manual_packs, edit_reason,
                 requested_by, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(input.stock_count_entry_id)
            .bind(old_manual_packs)
            .bind(input.new_manual_packs)
            .bind(&input.edit_reason)
            .bind(input.requested_by)
            .bind(STATUS_PENDING)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EditRequestInsert::Created(row))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EditRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stock_edit_requests WHERE id = $1");
        sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Approve a pending request and write its new count to the entry.
    ///
    /// Locks the request, then the entry. Nothing is written unless the
    /// request is pending, the entry is approved and the entry's manual count
    /// still equals the request's snapshot.
    pub async fn approve_and_apply(
        pool: &PgPool,
        id: DbId,
        reviewer: DbId,
    ) -> Result<EditApproval, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM stock_edit_requests WHERE id = $1 FOR UPDATE");
        let request = sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let request = match request {
            None => return Ok(EditApproval::RequestNotFound),
            Some(r) if r.status != STATUS_PENDING => {
                return Ok(EditApproval::RequestNotPending(r.status))
            }
            Some(r) => r,
        };

        let entry_id = request.stock_count_entry_id;
        let entry: Option<(String, i64)> = sqlx::query_as(
            "SELECT status, manual_packs FROM stock_count_entries WHERE id = $1 FOR UPDATE",
        )
        .bind(entry_id)
        .fetch_optional(&mut *tx)
        .await?;
        match entry {
            Some((status, _)) if status != STATUS_APPROVED => {
                return Ok(EditApproval::EntryNotApproved(entry_id))
            }
            Some((_, manual_packs)) if manual_packs != request.old_manual_packs => {
                return Ok(EditApproval::EntryChanged(entry_id))
            }
            Some(_) => {}
            // Requests cascade with their entry, so this only happens if the
            // entry was deleted between the two locks.
            None => return Ok(EditApproval::EntryNotApproved(entry_id)),
        }

        // variance_packs is a generated column and follows manual_packs.
        let query = format!(
            "UPDATE stock_count_entries
             SET manual_packs = $2, updated_at = NOW(), version = version + 1
             WHERE id = $1
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, StockCountRow>(&query)
            .bind(entry_id)
            .bind(request.new_manual_packs)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE stock_edit_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), updated_at = NOW(),
                 version = version + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(reviewer)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EditApproval::Applied(request, entry))
    }

    /// Reject a pending request. Returns `None` if it does not exist or was
    /// already reviewed.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reviewer: DbId,
        reason: &str,
    ) -> Result<Option<EditRequestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE stock_edit_requests
             SET status = $2, reviewed_by = $3, rejection_reason = $4,
                 reviewed_at = NOW(), updated_at = NOW(), version = version + 1
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(id)
            .bind(STATUS_REJECTED)
            .bind(reviewer)
            .bind(reason)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// List requests matching `filter`, newest first, with the total count.
    pub async fn list(
        pool: &PgPool,
        filter: &EditRequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<EditRequestRow>, i64), sqlx::Error> {
        let status = filter.status.map(ReviewStatus::as_str);

        let query = format!(
            "SELECT {COLUMNS} FROM stock_edit_requests
             WHERE {FILTER_CLAUSE}
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, EditRequestRow>(&query)
            .bind(status)
            .bind(filter.stock_count_entry_id)
            .bind(filter.requested_by)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM stock_edit_requests WHERE {FILTER_CLAUSE}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(status)
            .bind(filter.stock_count_entry_id)
            .bind(filter.requested_by)
            .fetch_one(pool)
            .await?;

        Ok((rows, total.0))
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM stock_edit_requests WHERE status = $1")
                .bind(STATUS_PENDING)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}
