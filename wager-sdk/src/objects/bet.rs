//! Bet maker request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement status of a bet.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `wager-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    NotPlayed,
    Won,
    Lost,
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetStatus::NotPlayed => write!(f, "not_played"),
            BetStatus::Won => write!(f, "won"),
            BetStatus::Lost => write!(f, "lost"),
        }
    }
}

/// Request body for `POST /bet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceBetRequest {
    pub event_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// A bet as returned by the bet maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetResponse {
    pub id: i64,
    pub event_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: BetStatus,
}
