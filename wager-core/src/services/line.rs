//! Event lifecycle: creation, transitions, and outcome announcement.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use wager_sdk::objects::EventState;

use crate::broker::{BrokerError, OutcomePublisher};
use crate::entities::event::{Event, EventStore, EventStoreError, EventUpdate};
use crate::utils::unix_now;

const COEFFICIENT_TOO_LOW: &str = "Coefficient must be a number more than 1";
const DEADLINE_IN_PAST: &str = "Deadline must be greater than the current time";
const DEADLINE_REQUIRED: &str =
    "Current deadline has passed. A new deadline must be provided explicitly.";
const DEADLINE_MOVED_BACK: &str = "A new deadline must be equal or greater than the previous one.";

#[derive(Debug, Error)]
pub enum LineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Event not found")]
    NotFound,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Event with this ID already exists")]
    AlreadyExists,

    #[error("failed to publish outcome: {0}")]
    Publish(#[from] BrokerError),
}

impl From<EventStoreError> for LineError {
    fn from(e: EventStoreError) -> Self {
        match e {
            EventStoreError::NotFound(_) => LineError::NotFound,
            EventStoreError::AlreadyExists(_) => LineError::AlreadyExists,
        }
    }
}

/// Owns the event store and announces state changes.
#[derive(Clone)]
pub struct LineService {
    store: EventStore,
    publisher: Arc<dyn OutcomePublisher>,
    /// Held from reading the current event until the update is stored.
    updates: Arc<Mutex<()>>,
}

impl LineService {
    pub fn new(store: EventStore, publisher: Arc<dyn OutcomePublisher>) -> Self {
        Self {
            store,
            publisher,
            updates: Arc::new(Mutex::new(())),
        }
    }

    /// Register a new event under a fresh id.
    pub async fn create_event(
        &self,
        coefficient: Decimal,
        deadline: i64,
        state: EventState,
    ) -> Result<Event, LineError> {
        let coefficient = validate_coefficient(coefficient)?;
        validate_deadline(deadline, unix_now())?;

        let event = Event {
            event_id: Uuid::new_v4().to_string(),
            coefficient,
            deadline,
            state,
        };
        self.store.create(event.clone()).await?;

        info!(
            event_id = %event.event_id,
            coefficient = %event.coefficient,
            deadline = event.deadline,
            state = %event.state,
            "Event created"
        );
        Ok(event)
    }

    /// Apply a partial update to an event.
    ///
    /// When the update changes the state, the transition is published before
    /// the store is written. A publish failure leaves the event untouched. The
    /// reverse gap remains: if the broker accepted the message and the store
    /// write were lost, consumers would see an outcome the line provider does
    /// not hold.
    ///
    /// Updates run one at a time, so every published transition is measured
    /// against the state stored by the previous update.
    pub async fn update_event(
        &self,
        event_id: &str,
        update: EventUpdate,
    ) -> Result<Event, LineError> {
        let _guard = self.updates.lock().await;
        let current = self.store.get(event_id).await?;
        let now = unix_now();

        match update.deadline {
            None if current.deadline <= now => {
                return Err(LineError::InvalidTransition(DEADLINE_REQUIRED.to_string()));
            }
            Some(deadline) if deadline < current.deadline => {
                return Err(LineError::InvalidTransition(
                    DEADLINE_MOVED_BACK.to_string(),
                ));
            }
            _ => {}
        }

        let update = EventUpdate {
            coefficient: update.coefficient.map(validate_coefficient).transpose()?,
            deadline: update
                .deadline
                .map(|deadline| validate_deadline(deadline, now).map(|_| deadline))
                .transpose()?,
            state: update.state,
        };

        if let Some(state) = update.state.filter(|state| *state != current.state) {
            if let Err(e) = self.publisher.publish(event_id, state).await {
                warn!(event_id, state = %state, error = %e, "Outcome publish failed, update aborted");
                return Err(e.into());
            }
        }

        let event = self.store.update(event_id, &update).await?;
        info!(event_id, state = %event.state, deadline = event.deadline, "Event updated");
        Ok(event)
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Event, LineError> {
        Ok(self.store.get(event_id).await?)
    }

    /// Events still open for betting, in creation order.
    pub async fn list_active_events(&self) -> Vec<Event> {
        self.store.list_active(unix_now()).await
    }
}

/// Round to cents and require strictly more than 1.
fn validate_coefficient(coefficient: Decimal) -> Result<Decimal, LineError> {
    let rounded = coefficient.round_dp(2);
    if rounded <= Decimal::ONE {
        return Err(LineError::InvalidInput(COEFFICIENT_TOO_LOW.to_string()));
    }
    Ok(rounded)
}

fn validate_deadline(deadline: i64, now: i64) -> Result<(), LineError> {
    if deadline <= now {
        return Err(LineError::InvalidInput(DEADLINE_IN_PAST.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<(String, EventState)>>,
    }

    #[async_trait]
    impl OutcomePublisher for RecordingPublisher {
        async fn publish(&self, event_id: &str, state: EventState) -> Result<(), BrokerError> {
            self.sent.lock().await.push((event_id.to_string(), state));
            Ok(())
        }
    }

    /// Records after a delay, leaving room for a competing update.
    #[derive(Default)]
    struct SlowPublisher {
        sent: Mutex<Vec<EventState>>,
    }

    #[async_trait]
    impl OutcomePublisher for SlowPublisher {
        async fn publish(&self, _: &str, state: EventState) -> Result<(), BrokerError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.sent.lock().await.push(state);
            Ok(())
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl OutcomePublisher for FailingPublisher {
        async fn publish(&self, _: &str, _: EventState) -> Result<(), BrokerError> {
            Err(BrokerError::Timeout(Duration::from_secs(5)))
        }
    }

    fn service() -> (LineService, EventStore, Arc<RecordingPublisher>) {
        let store = EventStore::new();
        let publisher = Arc::new(RecordingPublisher::default());
        (
            LineService::new(store.clone(), publisher.clone()),
            store,
            publisher,
        )
    }

    fn future() -> i64 {
        unix_now() + 3600
    }

    #[tokio::test]
    async fn test_create_event_rounds_coefficient() {
        let (svc, _, _) = service();
        let event = svc
            .create_event(Decimal::new(1_755, 3), future(), EventState::New)
            .await
            .unwrap();
        assert_eq!(event.coefficient, Decimal::new(176, 2));
        assert!(Uuid::parse_str(&event.event_id).is_ok());
        assert_eq!(svc.get_event(&event.event_id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_create_event_rejects_low_coefficient() {
        let (svc, _, _) = service();
        for coefficient in [Decimal::ONE, Decimal::new(1_004, 3), Decimal::ZERO] {
            let err = svc
                .create_event(coefficient, future(), EventState::New)
                .await
                .unwrap_err();
            assert!(matches!(err, LineError::InvalidInput(ref m) if m == COEFFICIENT_TOO_LOW));
        }
    }

    #[tokio::test]
    async fn test_create_event_rejects_past_deadline() {
        let (svc, _, _) = service();
        let err = svc
            .create_event(Decimal::new(15, 1), unix_now() - 1, EventState::New)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), DEADLINE_IN_PAST);
    }

    #[tokio::test]
    async fn test_update_publishes_only_on_state_change() {
        let (svc, _, publisher) = service();
        let event = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();

        let same = EventUpdate {
            state: Some(EventState::New),
            coefficient: Some(Decimal::new(2, 0)),
            ..Default::default()
        };
        let updated = svc.update_event(&event.event_id, same).await.unwrap();
        assert_eq!(updated.coefficient, Decimal::new(2, 0));
        assert!(publisher.sent.lock().await.is_empty());

        let win = EventUpdate {
            state: Some(EventState::FinishedWin),
            ..Default::default()
        };
        let updated = svc.update_event(&event.event_id, win).await.unwrap();
        assert_eq!(updated.state, EventState::FinishedWin);
        assert_eq!(
            *publisher.sent.lock().await,
            vec![(event.event_id.clone(), EventState::FinishedWin)]
        );
    }

    #[tokio::test]
    async fn test_update_requires_deadline_after_expiry() {
        let (svc, store, publisher) = service();
        store
            .create(Event {
                event_id: "expired".to_string(),
                coefficient: Decimal::new(15, 1),
                deadline: unix_now() - 10,
                state: EventState::New,
            })
            .await
            .unwrap();

        let err = svc
            .update_event(
                "expired",
                EventUpdate {
                    state: Some(EventState::FinishedLose),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LineError::InvalidTransition(ref m) if m == DEADLINE_REQUIRED));
        assert!(publisher.sent.lock().await.is_empty());

        let deadline = future();
        let updated = svc
            .update_event(
                "expired",
                EventUpdate {
                    deadline: Some(deadline),
                    state: Some(EventState::FinishedLose),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.deadline, deadline);
        assert_eq!(updated.state, EventState::FinishedLose);
    }

    #[tokio::test]
    async fn test_update_rejects_earlier_deadline() {
        let (svc, _, _) = service();
        let event = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();
        let err = svc
            .update_event(
                &event.event_id,
                EventUpdate {
                    deadline: Some(event.deadline - 1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LineError::InvalidTransition(ref m) if m == DEADLINE_MOVED_BACK));

        let same = svc
            .update_event(
                &event.event_id,
                EventUpdate {
                    deadline: Some(event.deadline),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.deadline, event.deadline);
    }

    #[tokio::test]
    async fn test_update_validates_coefficient_before_publishing() {
        let (svc, store, publisher) = service();
        let event = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();
        let err = svc
            .update_event(
                &event.event_id,
                EventUpdate {
                    coefficient: Some(Decimal::new(9, 1)),
                    state: Some(EventState::FinishedWin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LineError::InvalidInput(_)));
        assert!(publisher.sent.lock().await.is_empty());
        assert_eq!(store.get(&event.event_id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_event_untouched() {
        let store = EventStore::new();
        let svc = LineService::new(store.clone(), Arc::new(FailingPublisher));
        let event = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();

        let err = svc
            .update_event(
                &event.event_id,
                EventUpdate {
                    state: Some(EventState::FinishedWin),
                    coefficient: Some(Decimal::new(3, 0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LineError::Publish(_)));
        assert_eq!(store.get(&event.event_id).await.unwrap(), event);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_updates_publish_in_store_order() {
        let store = EventStore::new();
        let publisher = Arc::new(SlowPublisher::default());
        let svc = LineService::new(store.clone(), publisher.clone());
        let event = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();

        let to = |state| EventUpdate {
            state: Some(state),
            ..Default::default()
        };
        let (win, lose) = tokio::join!(
            svc.update_event(&event.event_id, to(EventState::FinishedWin)),
            svc.update_event(&event.event_id, to(EventState::FinishedLose)),
        );
        win.unwrap();
        lose.unwrap();

        let sent = publisher.sent.lock().await.clone();
        let stored = store.get(&event.event_id).await.unwrap().state;
        assert_eq!(sent, vec![EventState::FinishedWin, EventState::FinishedLose]);
        assert_eq!(sent.last(), Some(&stored));
    }

    #[tokio::test]
    async fn test_update_unknown_event() {
        let (svc, _, _) = service();
        let err = svc
            .update_event("nope", EventUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LineError::NotFound));
    }

    #[tokio::test]
    async fn test_list_active_events_in_creation_order() {
        let (svc, store, _) = service();
        let first = svc
            .create_event(Decimal::new(15, 1), future(), EventState::New)
            .await
            .unwrap();
        store
            .create(Event {
                event_id: "old".to_string(),
                coefficient: Decimal::new(15, 1),
                deadline: unix_now() - 1,
                state: EventState::New,
            })
            .await
            .unwrap();
        let second = svc
            .create_event(Decimal::new(25, 1), future() + 10, EventState::New)
            .await
            .unwrap();

        let active = svc.list_active_events().await;
        assert_eq!(active, vec![first, second]);
    }
}
