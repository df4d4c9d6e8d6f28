//! Well-known role names and the approver capability check.
//!
//! Role names must match the `role` claim issued by the identity service.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_APPROVER: &str = "approver";
pub const ROLE_CLERK: &str = "clerk";

pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_APPROVER | ROLE_CLERK)
}

/// Whether a role may approve or reject entries and edit requests.
pub fn has_approver_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_APPROVER
}

/// The authenticated caller on whose behalf a workflow operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: String,
}

impl Actor {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_approver(&self) -> bool {
        has_approver_role(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_and_approver_can_approve() {
        assert!(has_approver_role(ROLE_ADMIN));
        assert!(has_approver_role(ROLE_APPROVER));
    }

    #[test]
    fn test_clerk_cannot_approve() {
        assert!(!has_approver_role(ROLE_CLERK));
        assert!(!has_approver_role(""));
        assert!(!has_approver_role("Approver"));
    }

    #[test]
    fn test_known_roles_are_case_sensitive() {
        assert!(is_known_role(ROLE_CLERK));
        assert!(is_known_role(ROLE_ADMIN));
        assert!(!is_known_role("Clerk"));
        assert!(!is_known_role("supervisor"));
    }

    #[test]
    fn test_actor_is_approver() {
        assert!(Actor::new(1, ROLE_APPROVER).is_approver());
        assert!(!Actor::new(2, ROLE_CLERK).is_approver());
    }
}
