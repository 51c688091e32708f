//! EventHub REST API client
//!
//! Thin typed wrapper around the backend endpoints. The bearer token is shared
//! by every clone of the client. A 401 on any request other than a credential
//! exchange is reported to the session owner as a `SessionEvent::Invalidated`;
//! the client itself never clears the session.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::models::{ApiMessage, CreateEventRequest, CreateUserRequest, Event, LoginRequest, LoginResponse};
use crate::state::session::SessionEvent;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::{log_api_error, log_api_request};

/// How a 401 from a request is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnauthorized {
    /// Credential exchange: 401 just means the credentials were wrong
    Report,
    /// Regular call: 401 means the session is gone
    InvalidateSession,
}

/// API client for the EventHub backend
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
    session_events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl ApiClient {
    /// Create a new ApiClient instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(EventHubError::Http)?;

        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: Arc::new(RwLock::new(None)),
            session_events: None,
        })
    }

    /// Report session invalidations to `sender`
    pub fn with_session_events(mut self, sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.session_events = Some(sender);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Attach (or detach) the bearer token used for subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// POST /api/login
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "api/login")?.json(&body);
        self.send_json(builder, OnUnauthorized::Report).await
    }

    /// POST /api/register
    pub async fn register_user(&self, request: &CreateUserRequest) -> Result<ApiMessage> {
        let builder = self.request(Method::POST, "api/register")?.json(request);
        self.send_message(builder, OnUnauthorized::Report).await
    }

    /// GET /api/events
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let builder = self.request(Method::GET, "api/events")?;
        self.send_json(builder, OnUnauthorized::InvalidateSession).await
    }

    /// POST /api/events
    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<ApiMessage> {
        let builder = self.request(Method::POST, "api/events")?.json(request);
        self.send_message(builder, OnUnauthorized::InvalidateSession).await
    }

    /// DELETE /api/events/{id}
    pub async fn delete_event(&self, event_id: i64) -> Result<ApiMessage> {
        let builder = self.request(Method::DELETE, &format!("api/events/{}", event_id))?;
        self.send_message(builder, OnUnauthorized::InvalidateSession).await
    }

    /// POST /api/events/{id}/register
    pub async fn register_for_event(&self, event_id: i64) -> Result<ApiMessage> {
        let builder = self.request(Method::POST, &format!("api/events/{}/register", event_id))?;
        self.send_message(builder, OnUnauthorized::InvalidateSession).await
    }

    /// DELETE /api/events/{id}/unregister
    pub async fn unregister_from_event(&self, event_id: i64) -> Result<ApiMessage> {
        let builder = self.request(Method::DELETE, &format!("api/events/{}/unregister", event_id))?;
        self.send_message(builder, OnUnauthorized::InvalidateSession).await
    }

    /// GET /api/user/events
    pub async fn user_events(&self) -> Result<Vec<Event>> {
        let builder = self.request(Method::GET, "api/user/events")?;
        self.send_json(builder, OnUnauthorized::InvalidateSession).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, on_unauthorized: OnUnauthorized) -> Result<T> {
        let response = self.dispatch(builder, on_unauthorized).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_message(&self, builder: RequestBuilder, on_unauthorized: OnUnauthorized) -> Result<ApiMessage> {
        let response = self.dispatch(builder, on_unauthorized).await?;
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiMessage::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn dispatch(&self, builder: RequestBuilder, on_unauthorized: OnUnauthorized) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().to_string();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = self.client.execute(request).await.map_err(|e| {
            log_api_error("eventhub", &e.to_string(), Some(&format!("{} {}", method, path)));
            EventHubError::Http(e)
        })?;

        let status = response.status();
        log_api_request(&method, &path, status.as_u16(), started.elapsed().as_millis() as u64);

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|body| body.message);

        if status == StatusCode::UNAUTHORIZED {
            if on_unauthorized == OnUnauthorized::InvalidateSession {
                self.report_invalid_session(&path, message.clone());
            }
            return Err(EventHubError::Unauthorized { message });
        }

        debug!(path = %path, status = status.as_u16(), message = ?message, "Backend rejected request");
        Err(EventHubError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn report_invalid_session(&self, path: &str, reason: Option<String>) {
        warn!(path = %path, reason = ?reason, "Backend rejected credentials, invalidating session");
        if let Some(sender) = &self.session_events {
            // The receiver only disappears when the application is shutting down.
            let _ = sender.send(SessionEvent::Invalidated { reason });
        }
    }
}
