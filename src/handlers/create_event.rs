//! Create-event form

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::CreateEventRequest;
use crate::services::{require_permission, Permission};
use crate::state::{AppContext, Route};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::parse_timestamp;
use crate::utils::logging::log_user_action;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: Option<DateTime<Utc>>,
}

impl EventForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_event_date(mut self, event_date: Option<DateTime<Utc>>) -> Self {
        self.event_date = event_date;
        self
    }

    /// Set the date from user input
    pub fn parse_event_date(mut self, input: &str) -> Result<Self> {
        let parsed = parse_timestamp(input)
            .ok_or_else(|| EventHubError::Validation(format!("Invalid event date: {}", input.trim())))?;
        self.event_date = Some(parsed);
        Ok(self)
    }

    /// Check the form and build the request body. A date strictly before
    /// `now` is rejected.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<CreateEventRequest> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(EventHubError::Validation("Event title is required".to_string()));
        }

        let event_date = self
            .event_date
            .ok_or_else(|| EventHubError::Validation("Please select an event date".to_string()))?;
        if event_date < now {
            return Err(EventHubError::Validation("Event date cannot be in the past".to_string()));
        }

        Ok(CreateEventRequest {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            event_date,
        })
    }
}

/// Submit the form. On success the route moves to Events and the caller
/// should refetch its event list.
pub async fn handle_create_event(ctx: &mut AppContext, form: &EventForm, now: DateTime<Utc>) -> bool {
    if let Err(e) = require_permission(ctx.user(), Permission::CreateEvents) {
        debug!(error = %e, "Create event without a session");
        ctx.navigate(Route::CreateEvent);
        ctx.notifications.warning("Please login to create events");
        return false;
    }

    let request = match form.validate(now) {
        Ok(request) => request,
        Err(e) => {
            ctx.notifications.error(e.user_message("Failed to create event"));
            return false;
        }
    };

    match ctx.api.create_event(&request).await {
        Ok(_) => {
            log_user_action(ctx.user().map(|u| u.user_id), "event_created", Some(&request.title));
            ctx.notifications.success("Event created successfully!");
            ctx.navigate(Route::Events);
            true
        }
        Err(e) => {
            ctx.notifications.error(e.user_message("Failed to create event"));
            false
        }
    }
}
