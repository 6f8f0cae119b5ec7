use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use wager_sdk::objects::BetResponse;

use super::BetStatus;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Bet {
    pub id: i64,
    pub event_id: String,
    pub amount: Decimal,
    pub status: BetStatus,
}

impl From<Bet> for BetResponse {
    fn from(bet: Bet) -> Self {
        BetResponse {
            id: bet.id,
            event_id: bet.event_id,
            amount: bet.amount,
            status: bet.status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBet {
    pub event_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("bet not found: {0}")]
    BetNotFound(i64),
}

/// Repository of [`Bet`] records.
#[async_trait]
pub trait BetStore: Send + Sync {
    /// Persist a new bet with status `not_played` and a fresh id.
    async fn create(&self, bet: NewBet) -> Result<Bet, StoreError>;

    /// Every bet, in insertion order.
    async fn list_all(&self) -> Result<Vec<Bet>, StoreError>;

    /// The first bet (lowest id) placed on `event_id`.
    ///
    /// Later bets on the same event are not reachable through this lookup,
    /// so only one bet per event can be settled.
    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<Bet>, StoreError>;

    /// Move a `not_played` bet to `status`.
    ///
    /// Returns `None` when the bet already holds a terminal status, in which
    /// case nothing is written.
    async fn mark_settled(&self, id: i64, status: BetStatus) -> Result<Option<Bet>, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local bet store. Ids start at 1 and increase with each insert.
#[derive(Clone, Default)]
pub struct InMemoryBetStore {
    bets: Arc<RwLock<Vec<Bet>>>,
}

impl InMemoryBetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BetStore for InMemoryBetStore {
    async fn create(&self, bet: NewBet) -> Result<Bet, StoreError> {
        let mut bets = self.bets.write().await;
        let bet = Bet {
            id: bets.len() as i64 + 1,
            event_id: bet.event_id,
            amount: bet.amount,
            status: BetStatus::NotPlayed,
        };
        bets.push(bet.clone());
        Ok(bet)
    }

    async fn list_all(&self) -> Result<Vec<Bet>, StoreError> {
        Ok(self.bets.read().await.clone())
    }

    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<Bet>, StoreError> {
        Ok(self
            .bets
            .read()
            .await
            .iter()
            .find(|bet| bet.event_id == event_id)
            .cloned())
    }

    async fn mark_settled(&self, id: i64, status: BetStatus) -> Result<Option<Bet>, StoreError> {
        let mut bets = self.bets.write().await;
        let bet = bets
            .iter_mut()
            .find(|bet| bet.id == id)
            .ok_or(StoreError::BetNotFound(id))?;
        if bet.status.is_terminal() {
            return Ok(None);
        }
        bet.status = status;
        Ok(Some(bet.clone()))
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL store
// ---------------------------------------------------------------------------

/// Bet store backed by the `bets` table.
#[derive(Clone)]
pub struct PgBetStore {
    pool: PgPool,
}

impl PgBetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BetStore for PgBetStore {
    #[tracing::instrument(skip_all, err, name = "SQL:CreateBet")]
    async fn create(&self, bet: NewBet) -> Result<Bet, StoreError> {
        let bet = sqlx::query_as::<_, Bet>(
            r#"
            INSERT INTO bets (event_id, amount, status)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, amount, status
            "#,
        )
        .bind(bet.event_id)
        .bind(bet.amount)
        .bind(BetStatus::NotPlayed)
        .fetch_one(&self.pool)
        .await?;
        Ok(bet)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ListBets")]
    async fn list_all(&self) -> Result<Vec<Bet>, StoreError> {
        let bets = sqlx::query_as::<_, Bet>(
            r#"
            SELECT id, event_id, amount, status
            FROM bets
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(bets)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FindBetByEventId")]
    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<Bet>, StoreError> {
        let bet = sqlx::query_as::<_, Bet>(
            r#"
            SELECT id, event_id, amount, status
            FROM bets
            WHERE event_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bet)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:MarkBetSettled")]
    async fn mark_settled(&self, id: i64, status: BetStatus) -> Result<Option<Bet>, StoreError> {
        let bet = sqlx::query_as::<_, Bet>(
            r#"
            UPDATE bets
            SET status = $2
            WHERE id = $1 AND status = 'not_played'
            RETURNING id, event_id, amount, status
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bet(event_id: &str, cents: i64) -> NewBet {
        NewBet {
            event_id: event_id.to_string(),
            amount: Decimal::new(cents, 2),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = InMemoryBetStore::new();
        let first = store.create(new_bet("a", 1000)).await.unwrap();
        let second = store.create(new_bet("b", 2000)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, BetStatus::NotPlayed);

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_returns_first_match() {
        let store = InMemoryBetStore::new();
        let first = store.create(new_bet("a", 1000)).await.unwrap();
        store.create(new_bet("a", 3000)).await.unwrap();

        let found = store.find_by_event_id("a").await.unwrap();
        assert_eq!(found, Some(first));
        assert_eq!(store.find_by_event_id("zzz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mark_settled_only_once() {
        let store = InMemoryBetStore::new();
        let bet = store.create(new_bet("a", 1000)).await.unwrap();

        let settled = store.mark_settled(bet.id, BetStatus::Won).await.unwrap();
        assert_eq!(settled.map(|b| b.status), Some(BetStatus::Won));

        let again = store.mark_settled(bet.id, BetStatus::Lost).await.unwrap();
        assert_eq!(again, None);
        assert_eq!(
            store.find_by_event_id("a").await.unwrap().map(|b| b.status),
            Some(BetStatus::Won)
        );
    }

    #[tokio::test]
    async fn test_mark_settled_unknown_id() {
        let store = InMemoryBetStore::new();
        let result = store.mark_settled(7, BetStatus::Won).await;
        assert!(matches!(result, Err(StoreError::BetNotFound(7))));
    }
}
