//! Line provider API handlers.
//!
//! # Endpoints
//!
//! - `POST /events/`           – create an event
//! - `GET  /events/`           – list events still open for betting
//! - `GET  /events/{event_id}` – fetch one event
//! - `PUT  /events/{event_id}` – partially update an event

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use wager_core::entities::event::EventUpdate;
use wager_core::services::LineError;
use wager_sdk::objects::{CreateEventRequest, EventResponse, UpdateEventRequest};

use super::{JsonBody, error_response};
use crate::state::LineState;

/// Build the events API router.
pub fn router() -> Router<LineState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/", get(list_events).post(create_event))
        .route("/events/{event_id}", get(get_event).put(update_event))
}

/// Errors returned by the events API.
#[derive(Debug)]
enum EventsApiError {
    /// A field failed validation.
    InvalidInput(String),
    /// The request cannot be applied to the event as it stands.
    BadRequest(String),
    NotFound,
    /// The transition could not be announced; nothing was written.
    PublishFailed(String),
    Internal(String),
}

impl From<LineError> for EventsApiError {
    fn from(e: LineError) -> Self {
        match e {
            LineError::InvalidInput(message) => EventsApiError::InvalidInput(message),
            LineError::InvalidTransition(message) => EventsApiError::BadRequest(message),
            LineError::NotFound => EventsApiError::NotFound,
            LineError::Publish(e) => EventsApiError::PublishFailed(e.to_string()),
            e @ LineError::AlreadyExists => EventsApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for EventsApiError {
    fn into_response(self) -> Response {
        match self {
            EventsApiError::InvalidInput(message) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            EventsApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            EventsApiError::NotFound => error_response(StatusCode::NOT_FOUND, "Event not found"),
            EventsApiError::PublishFailed(e) => {
                tracing::error!(error = %e, "Events API publish error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to publish event update",
                )
            }
            EventsApiError::Internal(e) => {
                tracing::error!(error = %e, "Events API internal error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

/// `POST /events/` — register a new event.
async fn create_event(
    state: State<LineState>,
    JsonBody(body): JsonBody<CreateEventRequest>,
) -> Result<impl IntoResponse, EventsApiError> {
    let event = state
        .events
        .create_event(body.coefficient, body.deadline, body.state)
        .await?;
    Ok(Json(EventResponse::from(event)))
}

/// `PUT /events/{event_id}` — apply a partial update.
///
/// An unknown event is reported as a bad request, like any other update
/// that cannot be applied.
async fn update_event(
    state: State<LineState>,
    Path(event_id): Path<String>,
    JsonBody(body): JsonBody<UpdateEventRequest>,
) -> Result<impl IntoResponse, EventsApiError> {
    let update = EventUpdate {
        coefficient: body.coefficient,
        deadline: body.deadline,
        state: body.state,
    };
    let event = state
        .events
        .update_event(&event_id, update)
        .await
        .map_err(|e| match e {
            LineError::NotFound => EventsApiError::BadRequest(e.to_string()),
            e => e.into(),
        })?;
    Ok(Json(EventResponse::from(event)))
}

/// `GET /events/{event_id}` — fetch one event regardless of its deadline.
async fn get_event(
    state: State<LineState>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, EventsApiError> {
    let event = state.events.get_event(&event_id).await?;
    Ok(Json(EventResponse::from(event)))
}

/// `GET /events/` — events whose deadline has not passed, in creation order.
async fn list_events(state: State<LineState>) -> impl IntoResponse {
    let events: Vec<EventResponse> = state
        .events
        .list_active_events()
        .await
        .into_iter()
        .map(Into::into)
        .collect();
    Json(events)
}
