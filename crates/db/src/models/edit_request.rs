//! Edit request rows.

use sqlx::FromRow;
use stockrecon_core::edit_request::EditRequest;
use stockrecon_core::error::CoreError;
use stockrecon_core::types::{DbId, Timestamp};

use super::parse_status;

/// A row from the `stock_edit_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct EditRequestRow {
    pub id: DbId,
    pub stock_count_entry_id: DbId,
    pub old_manual_packs: i64,
    pub new_manual_packs: i64,
    pub edit_reason: String,
    pub status: String,
    pub requested_by: DbId,
    pub reviewed_by: Option<DbId>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    pub version: i32,
}

impl TryFrom<EditRequestRow> for EditRequest {
    type Error = CoreError;

    fn try_from(row: EditRequestRow) -> Result<Self, Self::Error> {
        Ok(EditRequest {
            status: parse_status("stock_edit_requests", &row.status)?,
            id: row.id,
            stock_count_entry_id: row.stock_count_entry_id,
            old_manual_packs: row.old_manual_packs,
            new_manual_packs: row.new_manual_packs,
            edit_reason: row.edit_reason,
            requested_by: row.requested_by,
            reviewed_by: row.reviewed_by,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}
