//! Mock EventHub API server for testing
//!
//! Simulates the EventHub REST backend with wiremock. Every `mock_*` method
//! mounts one endpoint; `expect` counts are verified when the server drops.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock EventHub backend
pub struct EventHubMockServer {
    pub server: MockServer,
}

impl EventHubMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// POST /api/login answering with `token` and `user`
    pub async fn mock_login(&self, token: &str, user: Value) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": user })))
            .mount(&self.server)
            .await;
    }

    /// POST /api/register creating the account
    pub async fn mock_signup(&self, status: u16, message: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/register"))
            .respond_with(message_response(status, message))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// GET /api/events
    pub async fn mock_events(&self, events: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(events)))
            .mount(&self.server)
            .await;
    }

    /// GET /api/user/events
    pub async fn mock_user_events(&self, events: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/user/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(events)))
            .mount(&self.server)
            .await;
    }

    /// GET /api/user/events answered once per entry, in order; the last
    /// entry keeps answering after that
    pub async fn mock_user_events_sequence(&self, responses: Vec<Vec<Value>>) {
        let last = responses.len().saturating_sub(1);
        for (position, events) in responses.into_iter().enumerate() {
            let mock = Mock::given(method("GET"))
                .and(path("/api/user/events"))
                .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(events)));
            let mock = if position < last { mock.up_to_n_times(1) } else { mock };
            mock.mount(&self.server).await;
        }
    }

    /// GET /api/user/events only when called with `Bearer {token}`
    pub async fn mock_user_events_for_token(&self, token: &str, events: Vec<Value>, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/api/user/events"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(events)))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// POST /api/events
    pub async fn mock_create_event(&self, status: u16, message: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/events"))
            .respond_with(message_response(status, message))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// DELETE /api/events/{id}
    pub async fn mock_delete_event(&self, event_id: i64, status: u16, message: &str, expected_calls: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/events/{}", event_id)))
            .respond_with(message_response(status, message))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// POST /api/events/{id}/register
    pub async fn mock_register_event(&self, event_id: i64, status: u16, message: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/events/{}/register", event_id)))
            .respond_with(message_response(status, message))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// DELETE /api/events/{id}/unregister
    pub async fn mock_unregister_event(&self, event_id: i64, status: u16, message: &str, expected_calls: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/events/{}/unregister", event_id)))
            .respond_with(message_response(status, message))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Any request to `endpoint` with `http_method` is rejected with 401
    pub async fn mock_unauthorized(&self, http_method: &str, endpoint: &str, message: &str) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(message_response(401, message))
            .mount(&self.server)
            .await;
    }
}

fn message_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "message": message }))
}
