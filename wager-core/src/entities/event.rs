//! In-memory event repository.
//!
//! Events are kept in an append-only arena (events are never deleted) with a
//! map from `event_id` to arena slot. Listing walks the arena, so results come
//! back in insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;
use wager_sdk::objects::{EventResponse, EventState};

/// An event bets can be placed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_id: String,
    pub coefficient: Decimal,
    /// Unix timestamp (seconds).
    pub deadline: i64,
    pub state: EventState,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        EventResponse {
            event_id: event.event_id,
            coefficient: event.coefficient,
            deadline: event.deadline,
            state: event.state,
        }
    }
}

/// Partial update of an event. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdate {
    pub coefficient: Option<Decimal>,
    pub deadline: Option<i64>,
    pub state: Option<EventState>,
}

impl EventUpdate {
    fn apply_to(&self, event: &mut Event) {
        if let Some(coefficient) = self.coefficient {
            event.coefficient = coefficient;
        }
        if let Some(deadline) = self.deadline {
            event.deadline = deadline;
        }
        if let Some(state) = self.state {
            event.state = state;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("Event with this ID already exists")]
    AlreadyExists(String),

    #[error("Event not found")]
    NotFound(String),
}

#[derive(Default)]
struct EventArena {
    events: Vec<Event>,
    index: HashMap<String, usize>,
}

/// Keyed store of [`Event`] records.
///
/// Cloning is cheap and every clone refers to the same events. The store is
/// owned by a single line provider instance.
#[derive(Clone, Default)]
pub struct EventStore {
    inner: Arc<RwLock<EventArena>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new event.
    pub async fn create(&self, event: Event) -> Result<(), EventStoreError> {
        let mut arena = self.inner.write().await;
        if arena.index.contains_key(&event.event_id) {
            return Err(EventStoreError::AlreadyExists(event.event_id));
        }
        let slot = arena.events.len();
        arena.index.insert(event.event_id.clone(), slot);
        arena.events.push(event);
        Ok(())
    }

    /// Fetch a snapshot of an event.
    pub async fn get(&self, event_id: &str) -> Result<Event, EventStoreError> {
        let arena = self.inner.read().await;
        arena
            .index
            .get(event_id)
            .map(|&slot| arena.events[slot].clone())
            .ok_or_else(|| EventStoreError::NotFound(event_id.to_string()))
    }

    /// Apply every provided field in place and return the refreshed event.
    pub async fn update(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> Result<Event, EventStoreError> {
        let mut arena = self.inner.write().await;
        let slot = *arena
            .index
            .get(event_id)
            .ok_or_else(|| EventStoreError::NotFound(event_id.to_string()))?;
        let event = &mut arena.events[slot];
        update.apply_to(event);
        Ok(event.clone())
    }

    /// Events whose deadline is strictly after `now`, in insertion order.
    pub async fn list_active(&self, now: i64) -> Vec<Event> {
        self.inner
            .read()
            .await
            .events
            .iter()
            .filter(|event| event.deadline > now)
            .cloned()
            .collect()
    }
}
