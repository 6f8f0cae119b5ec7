//! Configuration types for the wager services.
//!
//! These types represent the validated runtime configuration used by the
//! server. The actual config loading/parsing is handled by the server crate.

mod broker;
mod services;

pub use broker::BrokerConfig;
pub use services::{BetMakerConfig, LineProviderConfig};
