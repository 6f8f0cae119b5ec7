pub mod bet;
pub mod event;
pub mod notification;

pub use bet::{BetResponse, BetStatus, PlaceBetRequest};
pub use event::{CreateEventRequest, EventResponse, EventState, UpdateEventRequest};
pub use notification::{DEFAULT_OUTCOME_QUEUE, Outcome, OutcomeNotification};

use serde::{Deserialize, Serialize};

/// Error body returned by both services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
