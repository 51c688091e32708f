//! Events view
//!
//! Lists every event as a card with its own registration widget. One refresh
//! fetches the events and (when signed in) the user's registrations, builds a
//! `RegistrationIndex` and syncs all widgets from it. Any mutation refetches.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::registration_status::{ChangeOutcome, RegistrationStatus};
use crate::models::{Event, RegistrationIndex, User};
use crate::services::{can_delete_event, require_permission, ApiClient, NotificationService, Permission};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_event_date, EventTiming};
use crate::utils::logging::log_event_action;

/// Ticket for an in-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything a card renders
#[derive(Debug)]
pub struct EventCard<'a> {
    pub event: &'a Event,
    pub timing: EventTiming,
    pub can_delete: bool,
    pub status: &'a RegistrationStatus,
}

impl EventCard<'_> {
    pub fn date_label(&self) -> String {
        format_event_date(self.event.event_date)
    }

    pub fn organizer(&self) -> &str {
        self.event.creator_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Default)]
pub struct EventsView {
    user: Option<User>,
    events: Vec<Event>,
    index: RegistrationIndex,
    widgets: HashMap<i64, RegistrationStatus>,
    generation: u64,
    loaded: bool,
}

impl EventsView {
    pub fn new(user: Option<&User>) -> Self {
        Self {
            user: user.cloned(),
            ..Self::default()
        }
    }

    /// Switch the viewing user. Widgets and the index belong to the old user
    /// and are dropped; an in-flight refresh becomes stale.
    pub fn set_user(&mut self, user: Option<&User>) {
        if self.user.as_ref().map(|u| u.user_id) == user.map(|u| u.user_id) {
            return;
        }
        self.user = user.cloned();
        self.index = RegistrationIndex::new();
        self.widgets.clear();
        self.generation += 1;
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn index(&self) -> &RegistrationIndex {
        &self.index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn event(&self, event_id: i64) -> Option<&Event> {
        self.events.iter().find(|event| event.event_id == event_id)
    }

    pub fn widget(&self, event_id: i64) -> Option<&RegistrationStatus> {
        self.widgets.get(&event_id)
    }

    pub fn cards(&self, now: DateTime<Utc>) -> Vec<EventCard<'_>> {
        self.events
            .iter()
            .filter_map(|event| {
                let status = self.widgets.get(&event.event_id)?;
                Some(EventCard {
                    event,
                    timing: event.timing(now),
                    can_delete: can_delete_event(self.user.as_ref(), event),
                    status,
                })
            })
            .collect()
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket {
            generation: self.generation,
        }
    }

    /// Apply fetched data. `registrations` is `None` when nobody is signed
    /// in. Returns false when the ticket was stale.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        events: Result<Vec<Event>>,
        registrations: Option<Result<Vec<Event>>>,
        now: DateTime<Utc>,
        notifications: &NotificationService,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(ticket = ticket.generation, current = self.generation, "Discarding stale events refresh");
            return false;
        }

        let events = match events {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to load events");
                notifications.error(e.user_message("Failed to load events"));
                return true;
            }
        };

        match registrations {
            Some(Ok(registered)) => self.index = RegistrationIndex::from_events(&registered),
            Some(Err(e)) => warn!(error = %e, "Failed to load registrations, keeping previous index"),
            None => self.index = RegistrationIndex::new(),
        }

        let user = self.user.as_ref();
        let mut widgets = HashMap::with_capacity(events.len());
        for event in &events {
            let mut widget = self
                .widgets
                .remove(&event.event_id)
                .unwrap_or_else(|| RegistrationStatus::new(event.event_id, user));
            widget.set_ended(event.has_ended(now));
            widget.sync_from_index(&self.index);
            widgets.insert(event.event_id, widget);
        }

        debug!(events = events.len(), registrations = self.index.len(), "Events view refreshed");
        self.widgets = widgets;
        self.events = events;
        self.loaded = true;
        true
    }

    /// Fetch events and registrations concurrently and apply them
    pub async fn refresh(&mut self, api: &ApiClient, notifications: &NotificationService, now: DateTime<Utc>) -> bool {
        let ticket = self.begin_refresh();
        let (events, registrations) = if self.user.is_some() {
            let (events, registrations) = futures::join!(api.list_events(), api.user_events());
            (events, Some(registrations))
        } else {
            (api.list_events().await, None)
        };
        self.apply_refresh(ticket, events, registrations, now, notifications)
    }

    pub async fn handle_register(
        &mut self,
        event_id: i64,
        api: &ApiClient,
        notifications: &NotificationService,
        now: DateTime<Utc>,
    ) -> ChangeOutcome {
        let Some(widget) = self.widgets.get_mut(&event_id) else {
            self.report_missing(event_id, notifications);
            return ChangeOutcome::Ignored;
        };
        let outcome = widget.register(api, notifications).await;
        if outcome.requires_refresh() {
            self.index.insert(event_id, Some(now));
            self.refresh(api, notifications, now).await;
        }
        outcome
    }

    pub async fn handle_unregister(
        &mut self,
        event_id: i64,
        api: &ApiClient,
        notifications: &NotificationService,
        now: DateTime<Utc>,
    ) -> ChangeOutcome {
        let Some(widget) = self.widgets.get_mut(&event_id) else {
            self.report_missing(event_id, notifications);
            return ChangeOutcome::Ignored;
        };
        let outcome = widget.unregister(api, notifications).await;
        if outcome.requires_refresh() {
            self.index.remove(event_id);
            self.refresh(api, notifications, now).await;
        }
        outcome
    }

    /// Delete an event. Refused locally, without a request, unless the user
    /// created the event or is an admin. Returns whether it was deleted.
    pub async fn handle_delete(
        &mut self,
        event_id: i64,
        api: &ApiClient,
        notifications: &NotificationService,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(created_by) = self.event(event_id).map(|event| event.created_by) else {
            self.report_missing(event_id, notifications);
            return false;
        };
        let user_id = self.user.as_ref().map(|u| u.user_id);

        if let Err(e) = require_permission(self.user.as_ref(), Permission::DeleteEvent { created_by }) {
            notifications.error(e.user_message("Please login to delete events"));
            return false;
        }

        match api.delete_event(event_id).await {
            Ok(_) => {
                info!(event_id = event_id, "Event deleted");
                log_event_action(event_id, "delete", user_id, true);
                notifications.success("Event deleted successfully");
                self.refresh(api, notifications, now).await;
                true
            }
            Err(e) => {
                log_event_action(event_id, "delete", user_id, false);
                notifications.error(e.user_message("Failed to delete event"));
                false
            }
        }
    }

    /// An action named an event this view does not hold. When the list never
    /// loaded, the load failure has already been reported.
    fn report_missing(&self, event_id: i64, notifications: &NotificationService) {
        if !self.loaded {
            debug!(event_id = event_id, "Events not loaded, skipping action");
            return;
        }
        warn!(event_id = event_id, "Action on unknown event");
        notifications.error(format!("Event #{} not found", event_id));
    }
}
