//! Axum server setup and router configuration.

use crate::api::{bets, events};
use crate::shutdown::shutdown_signal;
use crate::state::{BetState, LineState};
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the line provider router.
pub fn build_line_router(state: LineState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(events::router())
        .with_state(state)
}

/// Build the bet maker router.
pub fn build_bet_router(state: BetState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(bets::router())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
///
/// Background processors are told to stop through `shutdown_tx` once a
/// shutdown signal arrives.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wager_core::entities::event::EventStore;
    use wager_core::services::LineService;

    use crate::api::test_support::RecordingPublisher;

    #[tokio::test]
    async fn test_health_check() {
        let state = LineState {
            events: LineService::new(EventStore::new(), Arc::new(RecordingPublisher::default())),
        };
        let response = build_line_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }
}
