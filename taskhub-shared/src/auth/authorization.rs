/// Role-based authorization checks
///
/// Authorization runs after authentication: the middleware in
/// [`crate::auth::middleware`] establishes WHO the caller is, and these
/// helpers decide whether that identity may perform the operation. The
/// checks fail closed — a role below the requirement is rejected before
/// any handler logic runs.
///
/// # Permission Model
///
/// Roles form a strict hierarchy: Admin > Manager > User. A higher role
/// implies every capability of the roles below it.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::authorization::require_role;
/// use taskhub_shared::auth::middleware::AuthContext;
/// use taskhub_shared::models::user::Role;
///
/// fn check(auth: &AuthContext) -> Result<(), String> {
///     // Managers and admins may pass
///     require_role(auth, Role::Manager).map_err(|e| e.to_string())?;
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is below the requirement
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole { required: Role, actual: Role },

    /// Caller is neither the resource owner nor sufficiently privileged
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Checks that the caller holds the required role or higher
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` if the caller's role is below
/// the requirement.
pub fn require_role(auth: &AuthContext, required_role: Role) -> Result<(), AuthzError> {
    if !auth.role.has_permission(&required_role) {
        return Err(AuthzError::InsufficientRole {
            required: required_role,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Checks that the caller is the subject user, or holds the fallback role
///
/// Lets users act on their own account while managers/admins act on
/// anyone's.
///
/// # Errors
///
/// Returns `AuthzError::NotAuthorized` if the caller is neither the
/// subject nor sufficiently privileged.
pub fn require_self_or_role(
    auth: &AuthContext,
    subject_user_id: Uuid,
    fallback_role: Role,
) -> Result<(), AuthzError> {
    if auth.user_id == subject_user_id {
        return Ok(());
    }

    require_role(auth, fallback_role).map_err(|_| AuthzError::NotAuthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_role(role: Role) -> AuthContext {
        AuthContext::new(Uuid::new_v4(), "testuser".to_string(), role)
    }

    #[test]
    fn test_require_role_exact_match() {
        let auth = context_with_role(Role::Manager);
        assert!(require_role(&auth, Role::Manager).is_ok());
    }

    #[test]
    fn test_require_role_higher_passes() {
        let auth = context_with_role(Role::Admin);
        assert!(require_role(&auth, Role::User).is_ok());
        assert!(require_role(&auth, Role::Manager).is_ok());
        assert!(require_role(&auth, Role::Admin).is_ok());
    }

    #[test]
    fn test_require_role_lower_fails() {
        let auth = context_with_role(Role::User);
        assert!(require_role(&auth, Role::Manager).is_err());
        assert!(require_role(&auth, Role::Admin).is_err());

        let auth = context_with_role(Role::Manager);
        assert!(require_role(&auth, Role::Admin).is_err());
    }

    #[test]
    fn test_require_self_or_role_self_passes() {
        let auth = context_with_role(Role::User);
        assert!(require_self_or_role(&auth, auth.user_id, Role::Admin).is_ok());
    }

    #[test]
    fn test_require_self_or_role_other_needs_role() {
        let auth = context_with_role(Role::User);
        assert!(require_self_or_role(&auth, Uuid::new_v4(), Role::Manager).is_err());

        let auth = context_with_role(Role::Manager);
        assert!(require_self_or_role(&auth, Uuid::new_v4(), Role::Manager).is_ok());
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::InsufficientRole {
            required: Role::Admin,
            actual: Role::User,
        };
        assert!(err.to_string().contains("Insufficient permissions"));

        let err = AuthzError::NotAuthorized;
        assert!(err.to_string().contains("Not authorized"));
    }
}
