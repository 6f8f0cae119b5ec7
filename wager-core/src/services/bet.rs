//! Bet lifecycle: placement against a live event snapshot and settlement.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};
use wager_sdk::objects::{EventResponse, EventState, Outcome};

use super::source::{EventSource, SourceError};
use crate::entities::bet::{Bet, BetStore, NewBet, StoreError};
use crate::entities::BetStatus;
use crate::utils::unix_now;

#[derive(Debug, Error)]
pub enum BetError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("Betting deadline has passed")]
    DeadlineExpired,

    #[error("Market closed")]
    MarketClosed,

    #[error("line provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("line provider error: {0}")]
    Upstream(SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SourceError> for BetError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NotFound(_) => BetError::EventNotFound,
            e => BetError::Upstream(e),
        }
    }
}

/// Result of applying an outcome to a bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The bet moved from `not_played` to a terminal status.
    Applied(Bet),
    /// The bet already held the requested status; nothing was written.
    AlreadySettled(Bet),
}

#[derive(Debug, Error)]
pub enum SettleError {
    #[error("no bet placed on event {0}")]
    BetNotFound(String),

    #[error("unknown outcome status {0}")]
    InvalidOutcome(i32),

    #[error("bet {bet_id} is already {current}, refusing to mark it {requested}")]
    ConflictingOutcome {
        bet_id: i64,
        current: BetStatus,
        requested: BetStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettleError {
    /// Whether the notification was dealt with and must not be redelivered.
    pub fn is_handled(&self) -> bool {
        !matches!(self, SettleError::Store(_))
    }
}

/// Accepts bets and reconciles them with event outcomes.
#[derive(Clone)]
pub struct BetService {
    store: Arc<dyn BetStore>,
    source: Arc<dyn EventSource>,
    snapshot_timeout: Duration,
}

impl BetService {
    pub fn new(
        store: Arc<dyn BetStore>,
        source: Arc<dyn EventSource>,
        snapshot_timeout: Duration,
    ) -> Self {
        Self {
            store,
            source,
            snapshot_timeout,
        }
    }

    /// Validate against the current event snapshot and record a new bet.
    pub async fn place_bet(&self, event_id: &str, amount: Decimal) -> Result<Bet, BetError> {
        let amount = amount.round_dp(2);
        if amount <= Decimal::ZERO {
            return Err(BetError::InvalidInput(
                "Amount must be a positive number".to_string(),
            ));
        }

        let event = self.fetch_event(event_id).await?;
        if event.event_id != event_id {
            warn!(event_id, snapshot_id = %event.event_id, "Snapshot is for a different event");
            return Err(BetError::EventNotFound);
        }
        if event.deadline <= unix_now() {
            return Err(BetError::DeadlineExpired);
        }
        if event.state != EventState::New {
            return Err(BetError::MarketClosed);
        }

        let bet = self
            .store
            .create(NewBet {
                event_id: event_id.to_string(),
                amount,
            })
            .await?;
        info!(bet_id = bet.id, event_id, amount = %bet.amount, "Bet placed");
        Ok(bet)
    }

    pub async fn list_bets(&self) -> Result<Vec<Bet>, BetError> {
        Ok(self.store.list_all().await?)
    }

    /// Events that currently accept bets, as reported by the line provider.
    pub async fn list_events(&self) -> Result<Vec<EventResponse>, BetError> {
        tokio::time::timeout(self.snapshot_timeout, self.source.list_active_events())
            .await
            .map_err(|_| BetError::Timeout(self.snapshot_timeout))?
            .map_err(BetError::Upstream)
    }

    /// Apply an outcome notification to the bet placed on `event_id`.
    pub async fn settle_bet(&self, event_id: &str, status: i32) -> Result<Settlement, SettleError> {
        let bet = self
            .store
            .find_by_event_id(event_id)
            .await?
            .ok_or_else(|| SettleError::BetNotFound(event_id.to_string()))?;

        let requested = match Outcome::from_code(status).ok_or(SettleError::InvalidOutcome(status))? {
            Outcome::Win => BetStatus::Won,
            Outcome::Lose => BetStatus::Lost,
        };

        if bet.status.is_terminal() {
            return settled_outcome(bet, requested);
        }

        match self.store.mark_settled(bet.id, requested).await? {
            Some(bet) => {
                info!(bet_id = bet.id, event_id, status = %bet.status, "Bet settled");
                Ok(Settlement::Applied(bet))
            }
            // Settled concurrently between lookup and update.
            None => {
                let bet = self
                    .store
                    .find_by_event_id(event_id)
                    .await?
                    .ok_or_else(|| SettleError::BetNotFound(event_id.to_string()))?;
                settled_outcome(bet, requested)
            }
        }
    }

    async fn fetch_event(&self, event_id: &str) -> Result<EventResponse, BetError> {
        let event = tokio::time::timeout(self.snapshot_timeout, self.source.get_event(event_id))
            .await
            .map_err(|_| BetError::Timeout(self.snapshot_timeout))??;
        Ok(event)
    }
}

fn settled_outcome(bet: Bet, requested: BetStatus) -> Result<Settlement, SettleError> {
    if bet.status == requested {
        return Ok(Settlement::AlreadySettled(bet));
    }
    warn!(
        bet_id = bet.id,
        event_id = %bet.event_id,
        current = %bet.status,
        requested = %requested,
        "Conflicting outcome for settled bet"
    );
    Err(SettleError::ConflictingOutcome {
        bet_id: bet.id,
        current: bet.status,
        requested,
    })
}
