//! My events view
//!
//! Two tabs: events the user is registered for and events the user created.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::events::RefreshTicket;
use super::registration_status::{ChangeOutcome, RegistrationAction, RegistrationStatus};
use crate::models::{Event, RegistrationIndex, User};
use crate::services::{ApiClient, NotificationService};
use crate::utils::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MyEventsTab {
    #[default]
    Registered,
    Created,
}

#[derive(Debug)]
pub struct MyEventsView {
    user: User,
    tab: MyEventsTab,
    registered: Vec<Event>,
    created: Vec<Event>,
    index: RegistrationIndex,
    widgets: HashMap<i64, RegistrationStatus>,
    generation: u64,
    loaded: bool,
}

impl MyEventsView {
    pub fn new(user: &User) -> Self {
        Self {
            user: user.clone(),
            tab: MyEventsTab::default(),
            registered: Vec::new(),
            created: Vec::new(),
            index: RegistrationIndex::new(),
            widgets: HashMap::new(),
            generation: 0,
            loaded: false,
        }
    }

    pub fn tab(&self) -> MyEventsTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: MyEventsTab) {
        self.tab = tab;
    }

    pub fn registered(&self) -> &[Event] {
        &self.registered
    }

    pub fn created(&self) -> &[Event] {
        &self.created
    }

    /// Events of the active tab
    pub fn visible(&self) -> &[Event] {
        match self.tab {
            MyEventsTab::Registered => &self.registered,
            MyEventsTab::Created => &self.created,
        }
    }

    /// (registered, created) counts shown on the tabs
    pub fn counts(&self) -> (usize, usize) {
        (self.registered.len(), self.created.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn index(&self) -> &RegistrationIndex {
        &self.index
    }

    pub fn widget(&self, event_id: i64) -> Option<&RegistrationStatus> {
        self.widgets.get(&event_id)
    }

    /// Unregister is offered only for upcoming events
    pub fn can_unregister(&self, event_id: i64) -> bool {
        self.widgets
            .get(&event_id)
            .is_some_and(|widget| widget.action() == RegistrationAction::Unregister && widget.action_enabled())
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket::new(self.generation)
    }

    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        registered: Result<Vec<Event>>,
        all_events: Result<Vec<Event>>,
        now: DateTime<Utc>,
        notifications: &NotificationService,
    ) -> bool {
        if ticket.generation() != self.generation {
            debug!(ticket = ticket.generation(), current = self.generation, "Discarding stale my-events refresh");
            return false;
        }

        let (registered, all_events) = match (registered, all_events) {
            (Ok(registered), Ok(all_events)) => (registered, all_events),
            (Err(e), _) | (_, Err(e)) => {
                warn!(user_id = self.user.user_id, error = %e, "Failed to load user events");
                notifications.error("Failed to load your events");
                return true;
            }
        };

        self.index = RegistrationIndex::from_events(&registered);
        let mut widgets = HashMap::with_capacity(registered.len());
        for event in &registered {
            let mut widget = self
                .widgets
                .remove(&event.event_id)
                .unwrap_or_else(|| RegistrationStatus::new(event.event_id, Some(&self.user)));
            // Only upcoming registrations can still be cancelled.
            widget.set_ended(!event.is_upcoming(now));
            widget.sync_from_index(&self.index);
            widgets.insert(event.event_id, widget);
        }
        self.widgets = widgets;

        let user_id = self.user.user_id;
        self.created = all_events.into_iter().filter(|event| event.created_by == user_id).collect();
        self.registered = registered;
        self.loaded = true;
        true
    }

    pub async fn refresh(&mut self, api: &ApiClient, notifications: &NotificationService, now: DateTime<Utc>) -> bool {
        let ticket = self.begin_refresh();
        let (registered, all_events) = futures::join!(api.user_events(), api.list_events());
        self.apply_refresh(ticket, registered, all_events, now, notifications)
    }

    pub async fn handle_unregister(
        &mut self,
        event_id: i64,
        api: &ApiClient,
        notifications: &NotificationService,
        now: DateTime<Utc>,
    ) -> ChangeOutcome {
        let Some(widget) = self.widgets.get_mut(&event_id) else {
            if self.loaded {
                notifications.error(format!("You are not registered for event #{}", event_id));
            }
            return ChangeOutcome::Ignored;
        };
        let outcome = widget.unregister(api, notifications).await;
        if outcome.requires_refresh() {
            self.refresh(api, notifications, now).await;
        }
        outcome
    }
}
