//! Error handling for EventHub
//!
//! This module defines the main error types used throughout the client
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the EventHub client
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Unauthorized: {}", message.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { message: Option<String> },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Session storage error: {0}")]
    SessionStorage(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for EventHub operations
pub type Result<T> = std::result::Result<T, EventHubError>;

impl EventHubError {
    /// Check if the error is recoverable by simply re-triggering the action
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventHubError::Api { status, .. } => *status >= 500,
            EventHubError::Unauthorized { .. } => false,
            EventHubError::NotAuthenticated => false,
            EventHubError::Validation(_) => false,
            EventHubError::PermissionDenied(_) => false,
            EventHubError::Config(_) => false,
            EventHubError::ConfigLoad(_) => false,
            EventHubError::SessionStorage(_) => true,
            EventHubError::Http(_) => true,
            EventHubError::Serialization(_) => false,
            EventHubError::Io(_) => true,
            EventHubError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventHubError::Config(_) => ErrorSeverity::Critical,
            EventHubError::ConfigLoad(_) => ErrorSeverity::Critical,
            EventHubError::Unauthorized { .. } => ErrorSeverity::Warning,
            EventHubError::NotAuthenticated => ErrorSeverity::Warning,
            EventHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventHubError::Validation(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message to show the user for this failure.
    ///
    /// Backend failures carry their own `message` field, which wins; local
    /// validation and permission failures carry theirs. Everything else
    /// (transport errors, malformed bodies) falls back to the per-operation
    /// text supplied by the caller.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            EventHubError::Api { message: Some(message), .. }
            | EventHubError::Unauthorized { message: Some(message) } => message.clone(),
            EventHubError::Validation(message) | EventHubError::PermissionDenied(message) => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }

    /// HTTP status reported by the backend, if this error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            EventHubError::Api { status, .. } => Some(*status),
            EventHubError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
