pub mod edit_request;
pub mod health;
pub mod stock_count;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stock-counts                                    list, submit
/// /stock-counts/summary                            dashboard counters
/// /stock-counts/compare?date=                      manual vs system for a date
/// /stock-counts/{id}                               get
/// /stock-counts/{id}/approve                       approve (approver)
/// /stock-counts/{id}/reject                        reject (approver)
/// /stock-counts/{id}/edit-requests                 edit history, request edit
///
/// /edit-requests                                   list
/// /edit-requests/{id}                              get
/// /edit-requests/{id}/approve                      approve and apply (approver)
/// /edit-requests/{id}/reject                       reject (approver)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/stock-counts", stock_count::router())
        .nest("/edit-requests", edit_request::router())
}
