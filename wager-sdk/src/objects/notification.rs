//! Transition notifications carried on the outcome queue.

use serde::{Deserialize, Serialize};

use super::event::EventState;

/// Name of the durable queue notifications are published to by default.
pub const DEFAULT_OUTCOME_QUEUE: &str = "events";

/// Message announcing that an event's state changed.
///
/// `status` is kept as the raw integer code so that a consumer can tell a
/// malformed message (undecodable JSON) from a well-formed one carrying a
/// code it does not settle on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeNotification {
    pub event_id: String,
    pub status: i32,
}

impl OutcomeNotification {
    /// Build the notification for an event moving to `state`.
    pub fn new(event_id: impl Into<String>, state: EventState) -> Self {
        Self {
            event_id: event_id.into(),
            status: state.code(),
        }
    }

    /// Decode a notification from a raw message body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Encode the notification as a JSON message body.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Final result of an event as seen by settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    /// Map a notification status code to an outcome.
    ///
    /// Only the finished states settle bets; every other code is rejected.
    pub fn from_code(code: i32) -> Option<Self> {
        match EventState::from_code(code)? {
            EventState::FinishedWin => Some(Outcome::Win),
            EventState::FinishedLose => Some(Outcome::Lose),
            EventState::New => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Lose => write!(f, "LOSE"),
        }
    }
}
