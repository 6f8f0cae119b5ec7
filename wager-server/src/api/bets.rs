//! Bet maker API handlers.
//!
//! # Endpoints
//!
//! - `POST /bet`    – place a bet on an open event
//! - `GET  /bets`   – every bet with its current status
//! - `GET  /events` – events open for betting, proxied from the line provider

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use wager_core::services::BetError;
use wager_sdk::objects::{BetResponse, PlaceBetRequest};

use super::{JsonBody, error_response};
use crate::state::BetState;

/// Build the bets API router.
pub fn router() -> Router<BetState> {
    Router::new()
        .route("/bet", post(place_bet))
        .route("/bets", get(list_bets))
        .route("/events", get(list_events))
}

/// Errors returned by the bets API.
#[derive(Debug)]
struct BetsApiError(BetError);

impl From<BetError> for BetsApiError {
    fn from(e: BetError) -> Self {
        BetsApiError(e)
    }
}

impl IntoResponse for BetsApiError {
    fn into_response(self) -> Response {
        match self.0 {
            e @ BetError::InvalidInput(_) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            e @ BetError::EventNotFound => error_response(StatusCode::NOT_FOUND, e.to_string()),
            e @ (BetError::DeadlineExpired | BetError::MarketClosed) => {
                error_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            e @ (BetError::Timeout(_) | BetError::Upstream(_)) => {
                tracing::error!(error = %e, "Bets API line provider error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Connection error: {e}"),
                )
            }
            BetError::Store(e) => {
                tracing::error!(error = %e, "Bets API store error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

/// `POST /bet` — place a bet.
///
/// The event is fetched from the line provider and must still be open: its
/// deadline in the future and its state `NEW`.
async fn place_bet(
    state: State<BetState>,
    JsonBody(body): JsonBody<PlaceBetRequest>,
) -> Result<impl IntoResponse, BetsApiError> {
    let bet = state.bets.place_bet(&body.event_id, body.amount).await?;
    Ok(Json(BetResponse::from(bet)))
}

/// `GET /bets` — bet history in placement order.
async fn list_bets(state: State<BetState>) -> Result<impl IntoResponse, BetsApiError> {
    let bets: Vec<BetResponse> = state
        .bets
        .list_bets()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(bets))
}

/// `GET /events` — events open for betting.
async fn list_events(state: State<BetState>) -> Result<impl IntoResponse, BetsApiError> {
    Ok(Json(state.bets.list_events().await?))
}
