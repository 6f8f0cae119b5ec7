//! HTTP API handlers.
//!
//! - `events` – line provider endpoints
//! - `bets`   – bet maker endpoints
//!
//! Every error response carries a JSON body of the form `{"detail": "..."}`.

pub mod bets;
pub mod events;
mod extractors;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use wager_sdk::objects::ErrorDetail;

use extractors::JsonBody;

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorDetail::new(detail))).into_response()
}
