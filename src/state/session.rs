//! Session store
//!
//! Holds the signed-in user and their credential token, keeps the API client's
//! bearer token in step with it, and persists both through `SessionStorage`.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::storage::SessionStorage;
use crate::models::{CreateUserRequest, User};
use crate::services::ApiClient;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Signals sent to the single owner of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected our credentials (HTTP 401)
    Invalidated { reason: Option<String> },
}

/// The client-held (user, token) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

impl Session {
    /// Expiry from the token's `exp` claim.
    ///
    /// The signature is not checked: the client cannot verify it and only uses
    /// the claim to avoid sending a token it already knows is dead. Opaque
    /// (non-JWT) tokens have no known expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<ExpiryClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        data.claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}

/// Current session plus its persistence
#[derive(Debug)]
pub struct SessionStore {
    storage: SessionStorage,
    api: ApiClient,
    current: Option<Session>,
}

impl SessionStore {
    /// Create an empty store; call `restore` once at startup to pick up a persisted session
    pub fn new(storage: SessionStorage, api: ApiClient) -> Self {
        Self {
            storage,
            api,
            current: None,
        }
    }

    /// Read the persisted session once at startup.
    ///
    /// Sessions whose token has already expired are dropped instead of being
    /// restored.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<Option<User>> {
        let persisted = match self.storage.load() {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session, starting signed out");
                None
            }
        };

        match persisted {
            Some(session) if session.is_expired(now) => {
                info!(user_id = session.user.user_id, "Persisted session expired, discarding");
                self.storage.clear()?;
                self.api.set_token(None);
                self.current = None;
            }
            Some(session) => {
                self.api.set_token(Some(session.token.clone()));
                self.current = Some(session);
            }
            None => {
                self.api.set_token(None);
                self.current = None;
            }
        }

        Ok(self.user().cloned())
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|session| session.token.as_str())
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange credentials for a token and user profile, persist both and
    /// attach the token to every subsequent request
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let response = self.api.login(email, password).await?;
        Ok(self.establish(Session {
            token: response.token,
            user: response.user,
        }))
    }

    /// Create the account, then log in with the same credentials
    pub async fn register(&mut self, request: &CreateUserRequest) -> Result<User> {
        self.api.register_user(request).await?;
        log_user_action(None, "account_created", Some(&request.email));
        self.login(&request.email, &request.password).await
    }

    /// Clear the persisted state and the attached credential
    pub fn logout(&mut self) -> Result<()> {
        let user_id = self.user().map(|user| user.user_id);
        self.current = None;
        self.api.set_token(None);
        self.storage.clear()?;
        log_user_action(user_id, "logout", None);
        Ok(())
    }

    /// Forced logout after the backend rejected our credentials
    pub fn invalidate(&mut self, reason: Option<&str>) -> Result<()> {
        warn!(user_id = ?self.user().map(|user| user.user_id), reason = ?reason, "Session invalidated");
        self.current = None;
        self.api.set_token(None);
        self.storage.clear()
    }

    fn establish(&mut self, session: Session) -> User {
        // Keep the in-memory session even if it cannot be persisted.
        if let Err(e) = self.storage.save(&session) {
            warn!(error = %e, "Failed to persist session");
        }
        self.api.set_token(Some(session.token.clone()));
        let user = session.user.clone();
        self.current = Some(session);
        log_user_action(Some(user.user_id), "login", None);
        user
    }
}
