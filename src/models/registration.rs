//! Membership index built from "my events"

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::event::Event;

/// Set of events the current user is registered for, keyed by event id.
///
/// Built once per view refresh from `GET /api/user/events` and shared with
/// every registration widget of that view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationIndex {
    entries: HashMap<i64, Option<DateTime<Utc>>>,
}

impl RegistrationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: &[Event]) -> Self {
        events.iter().map(|event| (event.event_id, event.registered_at)).collect()
    }

    pub fn contains(&self, event_id: i64) -> bool {
        self.entries.contains_key(&event_id)
    }

    pub fn registered_at(&self, event_id: i64) -> Option<DateTime<Utc>> {
        self.entries.get(&event_id).copied().flatten()
    }

    pub fn insert(&mut self, event_id: i64, registered_at: Option<DateTime<Utc>>) {
        self.entries.insert(event_id, registered_at);
    }

    pub fn remove(&mut self, event_id: i64) -> bool {
        self.entries.remove(&event_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event ids in ascending order
    pub fn event_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<(i64, Option<DateTime<Utc>>)> for RegistrationIndex {
    fn from_iter<T: IntoIterator<Item = (i64, Option<DateTime<Utc>>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
