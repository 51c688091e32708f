//! Test data helpers
//!
//! Builders for users, backend event payloads and credential tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use EventHub::models::{Role, User};

pub const TEST_PASSWORD: &str = "secret123";

pub fn create_test_user(user_id: i64, role: Role) -> User {
    User {
        user_id,
        name: format!("Test User {}", user_id),
        email: format!("user{}@example.org", user_id),
        role,
    }
}

pub fn user_json(user: &User) -> Value {
    json!({
        "user_id": user.user_id,
        "name": user.name,
        "email": user.email,
        "role": user.role.as_str(),
    })
}

/// Token the backend would issue for `user`, expiring `valid_for` from now
pub fn create_test_token(user: &User, valid_for: Duration) -> String {
    let claims = json!({
        "user_id": user.user_id,
        "email": user.email,
        "role": user.role.as_str(),
        "exp": (Utc::now() + valid_for).timestamp(),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret")).unwrap_or_default()
}

/// Event as returned by GET /api/events (naive UTC timestamps)
pub fn event_json(event_id: i64, created_by: i64, event_date: DateTime<Utc>) -> Value {
    json!({
        "event_id": event_id,
        "title": format!("Event {}", event_id),
        "description": "A test event",
        "location": "Main hall",
        "event_date": event_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "created_by": created_by,
        "creator_name": format!("Test User {}", created_by),
        "registration_count": 3,
        "created_at": (event_date - Duration::days(30)).format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

/// Event as returned by GET /api/user/events: no count, with registered_at
pub fn registered_event_json(event_id: i64, created_by: i64, event_date: DateTime<Utc>) -> Value {
    json!({
        "event_id": event_id,
        "title": format!("Event {}", event_id),
        "description": "A test event",
        "location": "Main hall",
        "event_date": event_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "created_by": created_by,
        "creator_name": format!("Test User {}", created_by),
        "registered_at": (event_date - Duration::days(2)).format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}
