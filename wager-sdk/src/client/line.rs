//! Line provider client (bet maker → line provider).

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::event::{CreateEventRequest, EventResponse, UpdateEventRequest};

/// Typed HTTP client for the line provider's **events API**.
///
/// Every request is bounded by the timeout given at construction; a request
/// that exceeds it fails with [`ClientError::Http`].
#[derive(Debug, Clone)]
pub struct LineClient {
    http: Client,
    base_url: Url,
}

impl LineClient {
    /// Create a new `LineClient`.
    ///
    /// * `base_url` – root URL of the line provider (e.g. `http://line_provider:8001`).
    /// * `timeout` – upper bound for each request, connect included.
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, base_url }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /events/{event_id}` – fetch a single event.
    pub async fn get_event(&self, event_id: &str) -> Result<EventResponse, ClientError> {
        let url = self.event_url(event_id)?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/` – list events that still accept bets.
    pub async fn list_active_events(&self) -> Result<Vec<EventResponse>, ClientError> {
        let url = self.base_url.join("/events/")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/` – create an event.
    pub async fn create_event(
        &self,
        request: &CreateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let url = self.base_url.join("/events/")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `PUT /events/{event_id}` – partially update an event.
    pub async fn update_event(
        &self,
        event_id: &str,
        request: &UpdateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let url = self.event_url(event_id)?;
        let resp = self.http.put(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// URL of a single event, with `event_id` percent-encoded as one path segment.
    fn event_url(&self, event_id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.join("/events/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(event_id);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LineClient {
        LineClient::new(
            Url::parse("http://line_provider:8001").unwrap(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_event_url_keeps_id_in_one_segment() {
        let client = client();
        assert_eq!(
            client.event_url("abc").unwrap().as_str(),
            "http://line_provider:8001/events/abc"
        );
        assert_eq!(
            client.event_url("abc?x").unwrap().as_str(),
            "http://line_provider:8001/events/abc%3Fx"
        );
        assert_eq!(
            client.event_url("zz/../abc").unwrap().as_str(),
            "http://line_provider:8001/events/zz%2F..%2Fabc"
        );
        assert_eq!(
            client.event_url("a#b%").unwrap().as_str(),
            "http://line_provider:8001/events/a%23b%25"
        );
    }
}
