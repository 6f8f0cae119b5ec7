//! Line provider request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// State of an event.
///
/// Encoded on the wire as its integer code (`1`, `2`, `3`), which is also
/// the code carried by transition notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventState {
    New = 1,
    FinishedWin = 2,
    FinishedLose = 3,
}

impl EventState {
    /// Integer code of this state.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse a state from its integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(EventState::New),
            2 => Some(EventState::FinishedWin),
            3 => Some(EventState::FinishedLose),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventState::New => write!(f, "NEW"),
            EventState::FinishedWin => write!(f, "FINISHED_WIN"),
            EventState::FinishedLose => write!(f, "FINISHED_LOSE"),
        }
    }
}

impl Serialize for EventState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for EventState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = i32::deserialize(deserializer)?;
        EventState::from_code(code).ok_or_else(|| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Signed(code.into()),
                &"one of 1, 2, 3",
            )
        })
    }
}

/// Request body for `POST /events/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub coefficient: Decimal,
    /// Unix timestamp (seconds) after which bets are rejected.
    pub deadline: i64,
    pub state: EventState,
}

/// Request body for `PUT /events/{event_id}`.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub coefficient: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<EventState>,
}

/// An event as returned by the line provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub coefficient: Decimal,
    pub deadline: i64,
    pub state: EventState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_uses_integer_codes() {
        assert_eq!(serde_json::to_string(&EventState::FinishedWin).unwrap(), "2");
        let state: EventState = serde_json::from_str("3").unwrap();
        assert_eq!(state, EventState::FinishedLose);
        assert!(serde_json::from_str::<EventState>("7").is_err());
    }

    #[test]
    fn test_partial_update_parsing() {
        let update: UpdateEventRequest = serde_json::from_str(r#"{"state": 2}"#).unwrap();
        assert_eq!(update.state, Some(EventState::FinishedWin));
        assert_eq!(update.coefficient, None);
        assert_eq!(update.deadline, None);

        let update: UpdateEventRequest =
            serde_json::from_str(r#"{"coefficient": 1.75, "deadline": 1700000000}"#).unwrap();
        assert_eq!(update.coefficient, Some(Decimal::new(175, 2)));
        assert_eq!(update.deadline, Some(1_700_000_000));
        assert_eq!(update.state, None);
    }

    #[test]
    fn test_event_response_shape() {
        let event = EventResponse {
            event_id: "abc".to_string(),
            coefficient: Decimal::new(15, 1),
            deadline: 1_700_000_000,
            state: EventState::New,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "event_id": "abc",
                "coefficient": 1.5,
                "deadline": 1700000000,
                "state": 1,
            })
        );
    }
}
