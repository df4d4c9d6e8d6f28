//! Handlers for reviewing post-approval edit requests.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stockrecon_core::edit_request::EditRequest;
use stockrecon_core::stock_count::StockCountEntry;
use stockrecon_core::types::DbId;

use crate::error::AppResult;
use crate::handlers::stock_count::RejectRequest;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::{ValidJson, ValidPath, ValidQuery};
use crate::middleware::rbac::RequireApprover;
use crate::query::ListEditRequestsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of approving an edit: the reviewed request and the updated entry.
#[derive(Debug, Serialize)]
pub struct EditApprovalResponse {
    pub edit_request: EditRequest,
    pub stock_count: StockCountEntry,
}

/// GET /api/v1/edit-requests
pub async fn list_edit_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListEditRequestsParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .service
        .list_edit_requests(&params.filter(), params.page_request())
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/edit-requests/{id}
pub async fn get_edit_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.service.get_edit_request(id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/edit-requests/{id}/approve
///
/// Apply the proposed count to the entry. The request and the entry change
/// together or not at all.
pub async fn approve_edit_request(
    RequireApprover(auth): RequireApprover,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let (edit_request, stock_count) = state.service.approve_edit(&auth.actor(), id).await?;

    tracing::info!(
        user_id = auth.user_id,
        edit_request_id = id,
        entry_id = stock_count.id,
        manual_packs = stock_count.manual_packs,
        variance_packs = stock_count.variance_packs,
        "Edit request approved"
    );

    Ok(Json(DataResponse {
        data: EditApprovalResponse {
            edit_request,
            stock_count,
        },
    }))
}

/// POST /api/v1/edit-requests/{id}/reject
pub async fn reject_edit_request(
    RequireApprover(auth): RequireApprover,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<RejectRequest>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .service
        .reject_edit(&auth.actor(), id, &input.rejection_reason)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        edit_request_id = id,
        entry_id = request.stock_count_entry_id,
        "Edit request rejected"
    );

    Ok(Json(DataResponse { data: request }))
}
