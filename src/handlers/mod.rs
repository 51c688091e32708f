//! Interaction handlers
//!
//! Views, widgets and forms. Every failure is caught here and turned into a
//! notification:
//! - Registration-status widget
//! - Events and my-events views
//! - Create-event, login and sign-up forms

pub mod account;
pub mod create_event;
pub mod events;
pub mod my_events;
pub mod registration_status;

// Re-export commonly used handler types
pub use account::{handle_login, handle_logout, handle_signup, LoginForm, SignupForm};
pub use create_event::{handle_create_event, EventForm};
pub use events::{EventCard, EventsView, RefreshTicket};
pub use my_events::{MyEventsTab, MyEventsView};
pub use registration_status::{
    ChangeOutcome, PendingChange, RegistrationAction, RegistrationState, RegistrationStatus, StatusCheck,
};
