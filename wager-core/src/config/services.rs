use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

/// Line provider settings.
#[derive(Debug, Clone)]
pub struct LineProviderConfig {
    pub listen: SocketAddr,
}

/// Bet maker settings.
#[derive(Debug, Clone)]
pub struct BetMakerConfig {
    pub listen: SocketAddr,
    /// Root URL of the line provider's HTTP API.
    pub line_provider_url: Url,
    /// Upper bound for fetching an event snapshot.
    pub snapshot_timeout: Duration,
    /// PostgreSQL URL. Bets are kept in memory when absent.
    pub database_url: Option<String>,
}
