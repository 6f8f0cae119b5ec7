pub mod bet;
pub mod event;

use wager_sdk::objects::BetStatus as SdkBetStatus;

/// Bet status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `wager_sdk::objects::BetStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "bet_status")]
pub enum BetStatus {
    NotPlayed,
    Won,
    Lost,
}

impl BetStatus {
    /// `won` and `lost` are final; only `not_played` may change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, BetStatus::NotPlayed)
    }
}

impl From<BetStatus> for SdkBetStatus {
    fn from(value: BetStatus) -> Self {
        match value {
            BetStatus::NotPlayed => SdkBetStatus::NotPlayed,
            BetStatus::Won => SdkBetStatus::Won,
            BetStatus::Lost => SdkBetStatus::Lost,
        }
    }
}

impl From<SdkBetStatus> for BetStatus {
    fn from(value: SdkBetStatus) -> Self {
        match value {
            SdkBetStatus::NotPlayed => BetStatus::NotPlayed,
            SdkBetStatus::Won => BetStatus::Won,
            SdkBetStatus::Lost => BetStatus::Lost,
        }
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        SdkBetStatus::from(*self).fmt(f)
    }
}
