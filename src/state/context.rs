//! Application context
//!
//! Owns the settings, API client, session store, notification channel and the
//! current route. It is the only consumer of `SessionEvent`s: a 401 anywhere
//! becomes an event on the channel, and `process_session_events` turns it into
//! a cleared session and a move to the login route.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::session::{SessionEvent, SessionStore};
use super::storage::SessionStorage;
use crate::config::Settings;
use crate::models::User;
use crate::services::{ApiClient, NotificationService};
use crate::utils::errors::Result;

/// Views of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Events,
    MyEvents,
    CreateEvent,
}

impl Route {
    /// Routes that need a signed-in user
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::MyEvents | Route::CreateEvent)
    }
}

/// Application-wide context containing services and session state
#[derive(Debug)]
pub struct AppContext {
    pub settings: Settings,
    pub api: ApiClient,
    pub session: SessionStore,
    pub notifications: NotificationService,
    route: Route,
    session_events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl AppContext {
    /// Build the context from settings and restore the persisted session
    pub fn new(settings: Settings) -> Result<Self> {
        let storage = SessionStorage::new(settings.session_file());
        Self::with_storage(settings, storage)
    }

    /// Build the context with an explicit session storage
    pub fn with_storage(settings: Settings, storage: SessionStorage) -> Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let api = ApiClient::new(&settings.api)?.with_session_events(sender);
        let mut session = SessionStore::new(storage, api.clone());

        if let Some(user) = session.restore(Utc::now())? {
            info!(user_id = user.user_id, "Restored session");
        }

        Ok(Self {
            settings,
            api,
            session,
            notifications: NotificationService::default(),
            route: Route::Home,
            session_events: receiver,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Move to `route`; routes that need a session fall back to Login without one
    pub fn navigate(&mut self, route: Route) -> Route {
        self.route = if route.requires_session() && !self.session.is_authenticated() {
            debug!(requested = ?route, "Route requires a session, redirecting to login");
            Route::Login
        } else {
            route
        };
        self.route
    }

    /// Apply every pending session event.
    ///
    /// Several in-flight requests may all fail with 401; they collapse into a
    /// single logout, a single notification and a single redirect. Returns the
    /// number of events consumed.
    pub fn process_session_events(&mut self) -> Result<usize> {
        let mut consumed = 0;
        let mut last_reason = None;
        while let Ok(SessionEvent::Invalidated { reason }) = self.session_events.try_recv() {
            consumed += 1;
            last_reason = reason;
        }

        if consumed == 0 {
            return Ok(0);
        }

        let had_session = self.session.is_authenticated();
        self.session.invalidate(last_reason.as_deref())?;
        self.route = Route::Login;

        if had_session {
            self.notifications.warning("Your session has expired. Please log in again.");
        } else {
            self.notifications.warning("Please log in to continue.");
        }

        Ok(consumed)
    }
}
