//! Authorization Gate
//! Mission: Check an authenticated identity's role before privileged operations

use crate::errors::ApiError;
use crate::models::Role;
use uuid::Uuid;

/// Roles allowed to list, delete and re-role accounts.
pub const ADMIN_ROLES: [Role; 2] = [Role::Admin, Role::Manager];

/// Roles that can be granted through the role-update path. `admin` is
/// deliberately absent so the endpoint cannot be used for privilege
/// escalation.
pub const ASSIGNABLE_ROLES: [Role; 2] = [Role::Manager, Role::User];

/// Pass iff the actor's role is in the allow-list.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Access denied: insufficient permissions".to_string(),
        ))
    }
}

/// Gate a role mutation: admin/manager actors only, target role from the
/// closed assignable set, and never one's own account.
pub fn authorize_role_change(
    actor_id: &Uuid,
    actor_role: Role,
    target_id: &Uuid,
    new_role: &str,
) -> Result<Role, ApiError> {
    authorize(actor_role, &ADMIN_ROLES)?;

    let role = Role::from_str(new_role)
        .filter(|r| ASSIGNABLE_ROLES.contains(r))
        .ok_or_else(|| ApiError::Validation("Invalid role specified".to_string()))?;

    if actor_id == target_id {
        return Err(ApiError::Forbidden(
            "You cannot modify your own role".to_string(),
        ));
    }

    Ok(role)
}

/// A profile is visible to its owner and to admins.
pub fn authorize_profile_access(
    actor_id: &Uuid,
    actor_role: Role,
    target_id: &Uuid,
) -> Result<(), ApiError> {
    if actor_id == target_id || actor_role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not authorized to view this profile".to_string(),
        ))
    }
}
