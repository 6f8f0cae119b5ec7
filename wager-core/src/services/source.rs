//! Read access to event snapshots for the bet maker.

use async_trait::async_trait;
use thiserror::Error;
use wager_sdk::client::{ClientError, LineClient};
use wager_sdk::objects::EventResponse;

use super::line::LineService;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Event not found")]
    NotFound(String),

    #[error("line provider error: {0}")]
    Upstream(#[from] ClientError),
}

/// Where the bet maker reads event snapshots from.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<EventResponse, SourceError>;

    async fn list_active_events(&self) -> Result<Vec<EventResponse>, SourceError>;
}

#[async_trait]
impl EventSource for LineClient {
    async fn get_event(&self, event_id: &str) -> Result<EventResponse, SourceError> {
        // Empty and dot segments would address the collection, not an event.
        if matches!(event_id, "" | "." | "..") {
            return Err(SourceError::NotFound(event_id.to_string()));
        }
        LineClient::get_event(self, event_id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => SourceError::NotFound(event_id.to_string()),
                e => SourceError::Upstream(e),
            })
    }

    async fn list_active_events(&self) -> Result<Vec<EventResponse>, SourceError> {
        Ok(LineClient::list_active_events(self).await?)
    }
}

/// In-process source, used when both services share one runtime.
#[async_trait]
impl EventSource for LineService {
    async fn get_event(&self, event_id: &str) -> Result<EventResponse, SourceError> {
        LineService::get_event(self, event_id)
            .await
            .map(Into::into)
            .map_err(|_| SourceError::NotFound(event_id.to_string()))
    }

    async fn list_active_events(&self) -> Result<Vec<EventResponse>, SourceError> {
        Ok(LineService::list_active_events(self)
            .await
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
