//! Stock count entry rows.

use chrono::NaiveDate;
use sqlx::FromRow;
use stockrecon_core::error::CoreError;
use stockrecon_core::stock_count::StockCountEntry;
use stockrecon_core::types::{DbId, Timestamp};

use super::parse_status;

/// A row from the `stock_count_entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct StockCountRow {
    pub id: DbId,
    pub product_id: DbId,
    pub stock_date: NaiveDate,
    pub manual_packs: i64,
    pub system_packs: i64,
    pub variance_packs: i64,
    pub status: String,
    pub notes: Option<String>,
    pub submitted_by: DbId,
    pub reviewed_by: Option<DbId>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    pub version: i32,
}

impl TryFrom<StockCountRow> for StockCountEntry {
    type Error = CoreError;

    fn try_from(row: StockCountRow) -> Result<Self, Self::Error> {
        Ok(StockCountEntry {
            status: parse_status("stock_count_entries", &row.status)?,
            id: row.id,
            product_id: row.product_id,
            stock_date: row.stock_date,
            manual_packs: row.manual_packs,
            system_packs: row.system_packs,
            variance_packs: row.variance_packs,
            notes: row.notes,
            submitted_by: row.submitted_by,
            reviewed_by: row.reviewed_by,
            admin_notes: row.admin_notes,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

/// Status counts for one stock date.
#[derive(Debug, Clone, FromRow)]
pub struct DailyCountsRow {
    pub submitted: i64,
    pub pending: i64,
    pub approved: i64,
}
