//! Query parameter types for list endpoints.
//!
//! Filters are declared flat, next to `page` and `limit`, and converted into
//! the core filter types by the handlers.

use chrono::NaiveDate;
use serde::Deserialize;
use stockrecon_core::edit_request::EditRequestFilter;
use stockrecon_core::pagination::PageRequest;
use stockrecon_core::status::ReviewStatus;
use stockrecon_core::stock_count::EntryFilter;
use stockrecon_core::types::DbId;

/// Page-based pagination parameters (`?page=&limit=`).
///
/// Values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `GET /stock-counts` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListStockCountsParams {
    pub status: Option<ReviewStatus>,
    pub product_id: Option<DbId>,
    pub stock_date: Option<NaiveDate>,
    pub submitted_by: Option<DbId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListStockCountsParams {
    pub fn filter(&self) -> EntryFilter {
        EntryFilter {
            status: self.status,
            product_id: self.product_id,
            stock_date: self.stock_date,
            submitted_by: self.submitted_by,
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `GET /edit-requests` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListEditRequestsParams {
    pub status: Option<ReviewStatus>,
    pub stock_count_entry_id: Option<DbId>,
    pub requested_by: Option<DbId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListEditRequestsParams {
    pub fn filter(&self) -> EditRequestFilter {
        EditRequestFilter {
            status: self.status,
            stock_count_entry_id: self.stock_count_entry_id,
            requested_by: self.requested_by,
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `GET /stock-counts/compare` parameters.
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub date: NaiveDate,
}
