//! Data models module
//!
//! This module contains the wire types exchanged with the EventHub backend

pub mod user;
pub mod event;
pub mod registration;

// Re-export commonly used models
pub use user::{User, Role, LoginRequest, LoginResponse, CreateUserRequest};
pub use event::{Event, CreateEventRequest, ApiMessage};
pub use registration::RegistrationIndex;
