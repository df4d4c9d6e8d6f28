use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stock_count;
use crate::state::AppState;

/// Routes mounted at `/stock-counts`.
///
/// ```text
/// GET, POST  /
/// GET        /summary
/// GET        /compare
/// GET        /{id}
/// POST       /{id}/approve
/// POST       /{id}/reject
/// GET, POST  /{id}/edit-requests
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(stock_count::list_stock_counts).post(stock_count::submit_stock_count),
        )
        .route("/summary", get(stock_count::get_summary))
        .route("/compare", get(stock_count::compare_for_date))
        .route("/{id}", get(stock_count::get_stock_count))
        .route("/{id}/approve", post(stock_count::approve_stock_count))
        .route("/{id}/reject", post(stock_count::reject_stock_count))
        .route(
            "/{id}/edit-requests",
            get(stock_count::list_entry_edit_requests).post(stock_count::request_edit),
        )
}
