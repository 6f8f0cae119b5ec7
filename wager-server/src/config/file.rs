//! TOML file configuration structures.
//!
//! These structs directly map to the `wager-config.toml` file format. Every
//! key is optional; a missing key takes the default shown below.
//!
//! ```toml
//! [line_provider]
//! listen = "0.0.0.0:8001"
//!
//! [bet_maker]
//! listen = "0.0.0.0:8002"
//! line_provider_url = "http://line_provider:8001"
//! snapshot_timeout_secs = 5
//!
//! [broker]
//! queue = "events"
//! publish_timeout_secs = 5
//! prefetch = 10
//! ```

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use wager_sdk::objects::DEFAULT_OUTCOME_QUEUE;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub line_provider: LineProviderConfig,
    pub bet_maker: BetMakerConfig,
    pub broker: BrokerConfig,
}

/// Line provider section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineProviderConfig {
    pub listen: SocketAddr,
}

impl Default for LineProviderConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8001)),
        }
    }
}

/// Bet maker section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BetMakerConfig {
    pub listen: SocketAddr,
    /// Root URL of the line provider. `LINE_PROVIDER_URL` takes precedence.
    pub line_provider_url: String,
    pub snapshot_timeout_secs: u64,
}

impl Default for BetMakerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8002)),
            line_provider_url: "http://line_provider:8001".to_string(),
            snapshot_timeout_secs: 5,
        }
    }
}

/// Broker section. The URL itself only comes from `RABBITMQ_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub queue: String,
    pub publish_timeout_secs: u64,
    pub prefetch: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue: DEFAULT_OUTCOME_QUEUE.to_string(),
            publish_timeout_secs: 5,
            prefetch: 10,
        }
    }
}
