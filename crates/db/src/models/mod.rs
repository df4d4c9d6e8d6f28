//! Row structs for the reconciliation tables.
//!
//! Each row struct derives `FromRow` and mirrors its table. Status columns
//! are stored as text and parsed into `ReviewStatus` when a row is
//! converted into its domain type.

pub mod edit_request;
pub mod product;
pub mod stock_count;

use std::str::FromStr;

use stockrecon_core::error::CoreError;
use stockrecon_core::status::ReviewStatus;

/// Parse a status column. An unknown value means the row is corrupt.
pub(crate) fn parse_status(table: &str, value: &str) -> Result<ReviewStatus, CoreError> {
    ReviewStatus::from_str(value).map_err(|_| {
        tracing::error!(table, status = value, "Unknown status value in database");
        CoreError::Internal(format!("Unknown status '{value}' in {table}"))
    })
}
