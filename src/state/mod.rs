//! State management module
//!
//! This module handles the session and application context

pub mod context;
pub mod session;
pub mod storage;

// Re-export commonly used state components
pub use context::{AppContext, Route};
pub use session::{Session, SessionEvent, SessionStore};
pub use storage::SessionStorage;
