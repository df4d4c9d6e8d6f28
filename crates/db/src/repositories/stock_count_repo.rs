//! Repository for the `stock_count_entries` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use stockrecon_core::pagination::PageRequest;
use stockrecon_core::status::{ReviewStatus, STATUS_PENDING};
use stockrecon_core::stock_count::{EntryFilter, NewStockCount};
use stockrecon_core::types::DbId;

use crate::models::stock_count::{DailyCountsRow, StockCountRow};

/// Column list for stock_count_entries queries.
pub(crate) const COLUMNS: &str = "id, product_id, stock_date, manual_packs, system_packs, \
    variance_packs, status, notes, submitted_by, reviewed_by, admin_notes, rejection_reason, \
    created_at, reviewed_at, updated_at, version";

/// Shared WHERE clause for filtered listing. Binds `$1..$4`.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR status = $1) \
    AND ($2::bigint IS NULL OR product_id = $2) \
    AND ($3::date IS NULL OR stock_date = $3) \
    AND ($4::bigint IS NULL OR submitted_by = $4)";

pub struct StockCountRepo;

impl StockCountRepo {
    /// Insert a pending entry.
    ///
    /// The partial unique index `uq_stock_count_entries_active_slot` rejects
    /// a second pending or approved entry for the same product and date.
    pub async fn create(pool: &PgPool, input: &NewStockCount) -> Result<StockCountRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO stock_count_entries
                (product_id, stock_date, manual_packs, system_packs, notes, submitted_by, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StockCountRow>(&query)
            .bind(input.product_id)
            .bind(input.stock_date)
            .bind(input.manual_packs)
            .bind(input.system_packs)
            .bind(&input.notes)
            .bind(input.submitted_by)
            .bind(STATUS_PENDING)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StockCountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stock_count_entries WHERE id = $1");
        sqlx::query_as::<_, StockCountRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a pending entry to `status`.
    ///
    /// Returns `None` when the entry does not exist or is no longer pending.
    /// The status test and the update are a single statement.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        status: ReviewStatus,
        reviewer: DbId,
        admin_notes: Option<&str>,
        rejection_reason: Option<&str>,
    ) -> Result<Option<StockCountRow>, sqlx::Error> {
        let query = format!(
            "UPDATE stock_count_entries
             SET status = $2, reviewed_by = $3, admin_notes = $4, rejection_reason = $5,
                 reviewed_at = NOW(), updated_at = NOW(), version = version + 1
             WHERE id = $1 AND status = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StockCountRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(reviewer)
            .bind(admin_notes)
            .bind(rejection_reason)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// List entries matching `filter`, newest first, with the total count.
    pub async fn list(
        pool: &PgPool,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<(Vec<StockCountRow>, i64), sqlx::Error> {
        let status = filter.status.map(ReviewStatus::as_str);

        let query = format!(
            "SELECT {COLUMNS} FROM stock_count_entries
             WHERE {FILTER_CLAUSE}
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, StockCountRow>(&query)
            .bind(status)
            .bind(filter.product_id)
            .bind(filter.stock_date)
            .bind(filter.submitted_by)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM stock_count_entries WHERE {FILTER_CLAUSE}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(status)
            .bind(filter.product_id)
            .bind(filter.stock_date)
            .bind(filter.submitted_by)
            .fetch_one(pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Pending and approved entries for a stock date.
    pub async fn list_active_for_date(
        pool: &PgPool,
        stock_date: NaiveDate,
    ) -> Result<Vec<StockCountRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stock_count_entries
             WHERE stock_date = $1 AND status IN ('pending', 'approved')
             ORDER BY product_id"
        );
        sqlx::query_as::<_, StockCountRow>(&query)
            .bind(stock_date)
            .fetch_all(pool)
            .await
    }

    /// Submitted, pending and approved counts for one stock date.
    pub async fn daily_counts(
        pool: &PgPool,
        stock_date: NaiveDate,
    ) -> Result<DailyCountsRow, sqlx::Error> {
        sqlx::query_as::<_, DailyCountsRow>(
            "SELECT
                COUNT(*) AS submitted,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved
             FROM stock_count_entries
             WHERE stock_date = $1",
        )
        .bind(stock_date)
        .fetch_one(pool)
        .await
    }
}
