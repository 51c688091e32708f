//! Test context for unified test setup
//!
//! Starts a mock backend and points settings (base URL, session directory)
//! at it and at a temporary directory.

use std::sync::Once;

use chrono::Duration;
use tempfile::TempDir;

use EventHub::{
    config::Settings,
    models::User,
    services::notification::{drain, Notification},
    state::{AppContext, Session, SessionStorage},
};

use super::{eventhub_mock::EventHubMockServer, test_data::create_test_token};

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

pub struct TestContext {
    pub mock: EventHubMockServer,
    pub settings: Settings,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        init_test_logging();

        let mock = EventHubMockServer::new().await;
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut settings = Settings::default();
        settings.api.base_url = mock.uri();
        settings.api.timeout_seconds = 5;
        settings.session.data_dir = temp_dir.path().to_string_lossy().into_owned();

        Self {
            mock,
            settings,
            temp_dir,
        }
    }

    pub fn storage(&self) -> SessionStorage {
        SessionStorage::new(self.settings.session_file())
    }

    /// Application context with no persisted session
    pub fn app(&self) -> AppContext {
        AppContext::new(self.settings.clone()).expect("Failed to create app context")
    }

    /// Application context restored from a persisted session for `user`.
    /// Returns the token the session carries.
    pub fn signed_in_app(&self, user: &User) -> (AppContext, String) {
        let token = create_test_token(user, Duration::hours(1));
        self.storage()
            .save(&Session {
                token: token.clone(),
                user: user.clone(),
            })
            .expect("Failed to persist session");

        let app = self.app();
        assert_eq!(app.user(), Some(user));
        (app, token)
    }
}

/// Messages of every notification received so far
pub fn messages(notifications: &[Notification]) -> Vec<String> {
    notifications.iter().map(|n| n.message.clone()).collect()
}

pub fn drain_messages(receiver: &mut tokio::sync::broadcast::Receiver<Notification>) -> Vec<String> {
    messages(&drain(receiver))
}
