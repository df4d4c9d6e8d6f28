use axum::routing::{get, post};
use axum::Router;

use crate::handlers::edit_request;
use crate::state::AppState;

/// Routes mounted at `/edit-requests`.
///
/// ```text
/// GET    /
/// GET    /{id}
/// POST   /{id}/approve
/// POST   /{id}/reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(edit_request::list_edit_requests))
        .route("/{id}", get(edit_request::get_edit_request))
        .route("/{id}/approve", post(edit_request::approve_edit_request))
        .route("/{id}/reject", post(edit_request::reject_edit_request))
}
