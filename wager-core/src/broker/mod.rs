//! Outcome notification transport over AMQP.
//!
//! The line provider publishes a notification whenever an event changes
//! state, and the bet maker consumes them to settle bets. Both sides declare
//! the same durable queue and use the default exchange.

pub mod consumer;
pub mod publisher;

pub use consumer::{Disposition, SettlementConsumer};
pub use publisher::{AmqpOutcomePublisher, OutcomePublisher};

use std::time::Duration;

use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::Channel;
use thiserror::Error;

/// Errors raised while talking to the message broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker answered the publish with a nack.
    #[error("message was not confirmed by the broker")]
    NotConfirmed,

    #[error("consumer stream closed by the broker")]
    ConsumerClosed,

    #[error("broker operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Declare the durable outcome queue on `channel`.
pub(crate) async fn declare_outcome_queue(channel: &Channel, queue: &str) -> Result<(), BrokerError> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok(())
}
