//! Authorization checks
//!
//! The backend is the authority on who may do what; these checks decide which
//! actions the client offers at all, so a forbidden action is refused locally
//! without a network call.

use tracing::debug;

use crate::models::{Event, User};
use crate::utils::errors::{EventHubError, Result};

/// Actions the client can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Anyone, signed in or not
    BrowseEvents,
    /// Any signed-in user
    CreateEvents,
    /// Any signed-in user
    ManageOwnRegistrations,
    /// Creator of the event or an admin
    DeleteEvent { created_by: i64 },
}

/// Check whether `user` holds `permission`
pub fn has_permission(user: Option<&User>, permission: Permission) -> bool {
    match (permission, user) {
        (Permission::BrowseEvents, _) => true,
        (_, None) => false,
        (Permission::CreateEvents, Some(_)) => true,
        (Permission::ManageOwnRegistrations, Some(_)) => true,
        (Permission::DeleteEvent { created_by }, Some(user)) => user.is_admin() || user.user_id == created_by,
    }
}

/// Require `permission` or return the error to surface to the user
pub fn require_permission(user: Option<&User>, permission: Permission) -> Result<()> {
    if has_permission(user, permission) {
        return Ok(());
    }

    debug!(user_id = ?user.map(|u| u.user_id), permission = ?permission, "Permission check failed");
    match (user, permission) {
        (None, _) => Err(EventHubError::NotAuthenticated),
        (Some(_), Permission::DeleteEvent { .. }) => Err(EventHubError::PermissionDenied(
            "Only the event creator or an admin can delete this event".to_string(),
        )),
        (Some(user), permission) => Err(EventHubError::PermissionDenied(format!(
            "User {} lacks required permission: {:?}",
            user.user_id, permission
        ))),
    }
}

/// Delete is offered only to the creator of the event or an admin
pub fn can_delete_event(user: Option<&User>, event: &Event) -> bool {
    has_permission(user, Permission::DeleteEvent { created_by: event.created_by })
}
