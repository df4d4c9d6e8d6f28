//! Request extractors: authentication, authorization and input parsing.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireApprover`] -- Requires the `approver` or `admin` role.
//! - [`extract`] -- `Json`/`Query`/`Path` wrappers whose rejections use the
//!   error envelope.

pub mod auth;
pub mod extract;
pub mod rbac;
