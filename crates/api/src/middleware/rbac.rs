//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stockrecon_core::error::CoreError;
use stockrecon_core::roles::has_approver_role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `approver` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// Runs before the request body is read, so a clerk posting a review gets a
/// 403 rather than a validation error.
pub struct RequireApprover(pub AuthUser);

impl FromRequestParts<AppState> for RequireApprover {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_approver_role(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Approver role required".into(),
            )));
        }
        Ok(RequireApprover(user))
    }
}
