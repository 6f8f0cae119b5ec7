//! Application state shared across request handlers.

use wager_core::services::{BetService, LineService};

/// State of the line provider.
///
/// Cloneable and cheap to pass around; the service shares its store.
#[derive(Clone)]
pub struct LineState {
    pub events: LineService,
}

/// State of the bet maker.
#[derive(Clone)]
pub struct BetState {
    pub bets: BetService,
}
