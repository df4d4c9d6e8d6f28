//! Handlers for stock count entries: submission, review, listing, the daily
//! comparison and the dashboard summary.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stockrecon_core::edit_request::{EditRequestFilter, RequestEdit};
use stockrecon_core::stock_count::SubmitStockCount;
use stockrecon_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::{ValidJson, ValidPath, ValidQuery};
use crate::middleware::rbac::RequireApprover;
use crate::query::{CompareParams, ListStockCountsParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the approve endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveEntryRequest {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Request body for the reject endpoints. A missing reason is treated as
/// empty so it fails validation rather than deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub rejection_reason: String,
}

/// POST /api/v1/stock-counts
///
/// Submit a manual count. The system count is read from the inventory ledger.
pub async fn submit_stock_count(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidJson(input): ValidJson<SubmitStockCount>,
) -> AppResult<impl IntoResponse> {
    let entry = state
        .service
        .submit(&auth.actor(), input, state.today())
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        entry_id = entry.id,
        product_id = entry.product_id,
        stock_date = %entry.stock_date,
        variance_packs = entry.variance_packs,
        "Stock count submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/stock-counts
pub async fn list_stock_counts(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListStockCountsParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .service
        .list_entries(&params.filter(), params.page_request())
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/stock-counts/summary
pub async fn get_summary(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = state.service.summary_stats(state.today()).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/stock-counts/compare?date=YYYY-MM-DD
///
/// One row per catalog product with its manual count (if any), system
/// count and variance for the date.
pub async fn compare_for_date(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<CompareParams>,
) -> AppResult<impl IntoResponse> {
    let rows = state.service.compare_for_date(params.date).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/stock-counts/{id}
pub async fn get_stock_count(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = state.service.get_entry(id).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/v1/stock-counts/{id}/approve
///
/// The body is optional; it only carries admin notes.
pub async fn approve_stock_count(
    RequireApprover(auth): RequireApprover,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    body: Option<ValidJson<ApproveEntryRequest>>,
) -> AppResult<impl IntoResponse> {
    let admin_notes = body.and_then(|ValidJson(req)| req.admin_notes);
    let entry = state
        .service
        .approve(&auth.actor(), id, admin_notes)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        entry_id = id,
        status = %entry.status,
        "Stock count approved"
    );

    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/v1/stock-counts/{id}/reject
pub async fn reject_stock_count(
    RequireApprover(auth): RequireApprover,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<RejectRequest>,
) -> AppResult<impl IntoResponse> {
    let entry = state
        .service
        .reject(&auth.actor(), id, &input.rejection_reason)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        entry_id = id,
        status = %entry.status,
        "Stock count rejected"
    );

    Ok(Json(DataResponse { data: entry }))
}

/// GET /api/v1/stock-counts/{id}/edit-requests
///
/// Edit history of one entry, newest first.
pub async fn list_entry_edit_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    state.service.get_entry(id).await?;

    let filter = EditRequestFilter {
        stock_count_entry_id: Some(id),
        ..Default::default()
    };
    let page = state
        .service
        .list_edit_requests(&filter, params.page_request())
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/stock-counts/{id}/edit-requests
///
/// Propose a corrected manual count for an approved entry.
pub async fn request_edit(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<RequestEdit>,
) -> AppResult<impl IntoResponse> {
    let request = state.service.request_edit(&auth.actor(), id, input).await?;

    tracing::info!(
        user_id = auth.user_id,
        entry_id = id,
        edit_request_id = request.id,
        old_manual_packs = request.old_manual_packs,
        new_manual_packs = request.new_manual_packs,
        "Edit requested"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}
