//! EventHub client
//!
//! Client for the EventHub event-management backend: browse events, create
//! and delete them, and keep each event's registration state in step with
//! the server. The library holds the session, views and widgets; the
//! `eventhub` binary drives them from the command line.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventHubError, Result};

// Re-export main components for easy access
pub use services::{ApiClient, NotificationService};
pub use state::{AppContext, Route, SessionEvent, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
