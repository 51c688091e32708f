//! Services module
//!
//! This module contains the backend client and the cross-cutting services
//! the views rely on

pub mod api;
pub mod auth;
pub mod notification;

// Re-export commonly used services
pub use api::ApiClient;
pub use auth::{Permission, has_permission, require_permission, can_delete_event};
pub use notification::{NotificationService, Notification, NotificationKind, NotificationStats};
