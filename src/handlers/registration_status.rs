//! Registration-status widget
//!
//! Per-event component that reconciles the local "am I registered" belief with
//! the backend. It is in exactly one of four states, each offering exactly one
//! action:
//!
//! | state            | action      |
//! |------------------|-------------|
//! | not authenticated| login prompt|
//! | checking         | none        |
//! | registered       | unregister  |
//! | not registered   | register    |
//!
//! Belief only changes once the backend has answered, so a failed request
//! needs no rollback. Every operation is split into a `begin_*` step that
//! hands out a ticket and an `apply_*`/`finish_*` step that consumes it; a
//! ticket issued before the inputs changed is stale and its result is dropped.

use tracing::debug;

use crate::models::{ApiMessage, RegistrationIndex, User};
use crate::services::{ApiClient, NotificationService};
use crate::utils::errors::Result;
use crate::utils::logging::log_event_action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    NotAuthenticated,
    Checking,
    Registered,
    NotRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    LoginPrompt,
    None,
    Unregister,
    Register,
}

impl RegistrationState {
    pub fn action(&self) -> RegistrationAction {
        match self {
            RegistrationState::NotAuthenticated => RegistrationAction::LoginPrompt,
            RegistrationState::Checking => RegistrationAction::None,
            RegistrationState::Registered => RegistrationAction::Unregister,
            RegistrationState::NotRegistered => RegistrationAction::Register,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Register,
    Unregister,
}

impl ChangeKind {
    fn action_name(&self) -> &'static str {
        match self {
            ChangeKind::Register => "register",
            ChangeKind::Unregister => "unregister",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            ChangeKind::Register => "Successfully registered for event!",
            ChangeKind::Unregister => "Successfully unregistered from event",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            ChangeKind::Register => "Failed to register for event",
            ChangeKind::Unregister => "Failed to unregister",
        }
    }

    /// Backend status meaning "you were already in the state you asked for"
    fn already_done_status(&self) -> u16 {
        match self {
            ChangeKind::Register => 409,
            ChangeKind::Unregister => 404,
        }
    }

    fn resulting_state(&self) -> RegistrationState {
        match self {
            ChangeKind::Register => RegistrationState::Registered,
            ChangeKind::Unregister => RegistrationState::NotRegistered,
        }
    }
}

/// Result of a register/unregister interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The backend applied the change; the parent should refetch
    Changed,
    /// The backend was already in the requested state; belief was corrected
    /// and the parent should refetch
    Reconciled,
    /// The backend refused; belief is unchanged
    Failed,
    /// Nothing was sent (no user, busy, or action not offered)
    Ignored,
}

impl ChangeOutcome {
    pub fn requires_refresh(&self) -> bool {
        matches!(self, ChangeOutcome::Changed | ChangeOutcome::Reconciled)
    }
}

/// Ticket for an in-flight membership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct StatusCheck {
    event_id: i64,
    target: u64,
    sequence: u64,
}

impl StatusCheck {
    pub fn event_id(&self) -> i64 {
        self.event_id
    }
}

/// Ticket for an in-flight register/unregister request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingChange {
    kind: ChangeKind,
    event_id: i64,
    target: u64,
}

impl PendingChange {
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationStatus {
    event_id: i64,
    user_id: Option<i64>,
    state: RegistrationState,
    /// Last answer we trusted, kept across a failed re-check
    known: Option<bool>,
    ended: bool,
    busy: bool,
    /// Bumped whenever the event or the user changes
    target: u64,
    /// Bumped whenever a check starts or belief is set from a fresher source
    sequence: u64,
}

impl RegistrationStatus {
    pub fn new(event_id: i64, user: Option<&User>) -> Self {
        Self {
            event_id,
            user_id: user.map(|user| user.user_id),
            state: if user.is_some() {
                RegistrationState::Checking
            } else {
                RegistrationState::NotAuthenticated
            },
            known: None,
            ended: false,
            busy: false,
            target: 0,
            sequence: 0,
        }
    }

    /// Mark the event as ended: the state is still tracked but no
    /// register/unregister action is offered
    pub fn with_ended(mut self, ended: bool) -> Self {
        self.ended = ended;
        self
    }

    pub fn set_ended(&mut self, ended: bool) {
        self.ended = ended;
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_registered(&self) -> bool {
        self.state == RegistrationState::Registered
    }

    /// The one action this widget currently offers
    pub fn action(&self) -> RegistrationAction {
        match self.state {
            RegistrationState::Registered | RegistrationState::NotRegistered if self.ended => RegistrationAction::None,
            state => state.action(),
        }
    }

    /// Whether the action control is clickable right now
    pub fn action_enabled(&self) -> bool {
        !self.busy && !matches!(self.action(), RegistrationAction::None | RegistrationAction::LoginPrompt)
    }

    /// Text rendering of the widget
    pub fn render(&self) -> String {
        match (self.state, self.ended, self.busy) {
            (RegistrationState::NotAuthenticated, _, _) => "Login to Register".to_string(),
            (RegistrationState::Checking, _, _) => "Checking registration...".to_string(),
            (RegistrationState::Registered, true, _) => "Registered | Event Ended".to_string(),
            (RegistrationState::Registered, false, true) => "Registered | Unregistering...".to_string(),
            (RegistrationState::Registered, false, false) => "Registered | Unregister".to_string(),
            (RegistrationState::NotRegistered, true, _) => "Event Ended".to_string(),
            (RegistrationState::NotRegistered, false, true) => "Registering...".to_string(),
            (RegistrationState::NotRegistered, false, false) => "Register".to_string(),
        }
    }

    /// Point the widget at a (possibly) different event or user.
    ///
    /// Returns a check ticket when the inputs actually changed and a user is
    /// present. Anything in flight for the old inputs becomes stale.
    pub fn set_target(&mut self, event_id: i64, user: Option<&User>) -> Option<StatusCheck> {
        let user_id = user.map(|user| user.user_id);
        if event_id == self.event_id && user_id == self.user_id {
            return None;
        }

        self.event_id = event_id;
        self.user_id = user_id;
        self.target += 1;
        self.known = None;
        self.busy = false;
        self.begin_check()
    }

    /// Start a membership check
    pub fn begin_check(&mut self) -> Option<StatusCheck> {
        if self.user_id.is_none() {
            self.state = RegistrationState::NotAuthenticated;
            return None;
        }

        self.sequence += 1;
        self.state = RegistrationState::Checking;
        Some(StatusCheck {
            event_id: self.event_id,
            target: self.target,
            sequence: self.sequence,
        })
    }

    /// Apply the outcome of a membership check. Returns false when the ticket
    /// was stale and the result was dropped.
    ///
    /// A failed check keeps the last trusted answer (not registered if there
    /// is none yet).
    pub fn apply_check(&mut self, check: StatusCheck, registered: Result<bool>) -> bool {
        if check.target != self.target || check.sequence != self.sequence {
            debug!(event_id = self.event_id, "Discarding stale registration check");
            return false;
        }

        match registered {
            Ok(registered) => self.set_belief(registered),
            Err(e) => {
                tracing::warn!(event_id = self.event_id, error = %e, "Failed to check registration status");
                self.set_belief(self.known.unwrap_or(false));
            }
        }
        true
    }

    /// Set belief from an index the parent view fetched for all its widgets
    pub fn sync_from_index(&mut self, index: &RegistrationIndex) {
        if self.user_id.is_none() {
            self.state = RegistrationState::NotAuthenticated;
            return;
        }
        if self.busy {
            return;
        }
        // Supersede any check that started before the index was fetched.
        self.sequence += 1;
        self.set_belief(index.contains(self.event_id));
    }

    /// Fetch the user's registrations and test membership
    pub async fn check(&mut self, api: &ApiClient) -> bool {
        let Some(ticket) = self.begin_check() else {
            return false;
        };
        let result = api
            .user_events()
            .await
            .map(|events| RegistrationIndex::from_events(&events).contains(ticket.event_id));
        self.apply_check(ticket, result)
    }

    pub fn begin_register(&mut self, notifications: &NotificationService) -> Option<PendingChange> {
        if self.user_id.is_none() {
            notifications.warning("Please login to register for events");
            return None;
        }
        self.begin_change(ChangeKind::Register, notifications)
    }

    pub fn begin_unregister(&mut self, notifications: &NotificationService) -> Option<PendingChange> {
        if self.user_id.is_none() {
            notifications.warning("Please login to manage your registrations");
            return None;
        }
        self.begin_change(ChangeKind::Unregister, notifications)
    }

    fn begin_change(&mut self, kind: ChangeKind, notifications: &NotificationService) -> Option<PendingChange> {
        if self.busy {
            debug!(event_id = self.event_id, action = kind.action_name(), "Request already in flight, ignoring");
            return None;
        }

        let offered = match kind {
            ChangeKind::Register => RegistrationAction::Register,
            ChangeKind::Unregister => RegistrationAction::Unregister,
        };
        if self.action() != offered {
            debug!(event_id = self.event_id, state = ?self.state, action = kind.action_name(), "Action not offered");
            self.explain_refusal(kind, notifications);
            return None;
        }

        self.busy = true;
        Some(PendingChange {
            kind,
            event_id: self.event_id,
            target: self.target,
        })
    }

    fn explain_refusal(&self, kind: ChangeKind, notifications: &NotificationService) {
        match (self.state, kind) {
            (RegistrationState::Checking, _) => {
                notifications.info("Still checking your registration, try again in a moment");
            }
            _ if self.ended => {
                notifications.warning("This event has already ended");
            }
            (RegistrationState::Registered, ChangeKind::Register) => {
                notifications.info("You are already registered for this event");
            }
            (RegistrationState::NotRegistered, ChangeKind::Unregister) => {
                notifications.info("You are not registered for this event");
            }
            _ => {}
        }
    }

    /// Apply the backend's answer to a register/unregister request and
    /// notify the user
    pub fn finish_change(
        &mut self,
        pending: PendingChange,
        result: Result<ApiMessage>,
        notifications: &NotificationService,
    ) -> ChangeOutcome {
        let current = pending.target == self.target;
        if current {
            self.busy = false;
        }

        let kind = pending.kind;
        let outcome = match result {
            Ok(_) => {
                if current {
                    self.apply_change(kind);
                }
                notifications.success(kind.success_message());
                ChangeOutcome::Changed
            }
            Err(e) if current && e.status() == Some(kind.already_done_status()) => {
                // The backend already holds the state we asked for; our belief was stale.
                self.apply_change(kind);
                notifications.info(e.user_message(kind.success_message()));
                ChangeOutcome::Reconciled
            }
            Err(e) => {
                notifications.error(e.user_message(kind.failure_message()));
                ChangeOutcome::Failed
            }
        };

        log_event_action(pending.event_id, kind.action_name(), self.user_id, outcome != ChangeOutcome::Failed);
        outcome
    }

    pub async fn register(&mut self, api: &ApiClient, notifications: &NotificationService) -> ChangeOutcome {
        let Some(pending) = self.begin_register(notifications) else {
            return ChangeOutcome::Ignored;
        };
        let result = api.register_for_event(pending.event_id).await;
        self.finish_change(pending, result, notifications)
    }

    pub async fn unregister(&mut self, api: &ApiClient, notifications: &NotificationService) -> ChangeOutcome {
        let Some(pending) = self.begin_unregister(notifications) else {
            return ChangeOutcome::Ignored;
        };
        let result = api.unregister_from_event(pending.event_id).await;
        self.finish_change(pending, result, notifications)
    }

    fn apply_change(&mut self, kind: ChangeKind) {
        // A check started before the change would report the old membership.
        self.sequence += 1;
        self.state = kind.resulting_state();
        self.known = Some(self.state == RegistrationState::Registered);
    }

    fn set_belief(&mut self, registered: bool) {
        self.known = Some(registered);
        self.state = if registered {
            RegistrationState::Registered
        } else {
            RegistrationState::NotRegistered
        };
    }
}
