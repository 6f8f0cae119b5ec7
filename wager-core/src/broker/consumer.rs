//! SettlementConsumer processor.
//!
//! The SettlementConsumer is responsible for:
//! - Subscribing to the outcome queue with manual acknowledgement
//! - Decoding each notification and settling the matching bet
//! - Acknowledging messages once they are settled or deliberately dropped
//! - Requeueing, after a short pause, messages that failed on a store error
//! - Reconnecting with exponential backoff when the broker goes away

use std::time::Duration;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use wager_sdk::objects::OutcomeNotification;

use super::{declare_outcome_queue, BrokerError};
use crate::services::bet::{BetService, Settlement};
use crate::utils::backoff::reconnect_delay;

const CONSUMER_TAG: &str = "wager-settlement";

/// Pause before a failed delivery is handed back to the broker.
const REQUEUE_DELAY: Duration = Duration::from_secs(1);

/// What to tell the broker about a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Requeue,
}

/// How a consuming session ended.
enum SessionEnd {
    Shutdown,
    /// The stream closed or failed after it was established.
    Lost(BrokerError),
}

/// Long-lived subscriber that settles bets from outcome notifications.
pub struct SettlementConsumer {
    url: String,
    queue: String,
    prefetch: u16,
    bets: BetService,
    shutdown_rx: watch::Receiver<bool>,
}

impl SettlementConsumer {
    pub fn new(
        url: impl Into<String>,
        queue: impl Into<String>,
        prefetch: u16,
        bets: BetService,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            url: url.into(),
            queue: queue.into(),
            prefetch,
            bets,
            shutdown_rx,
        }
    }

    /// Run the SettlementConsumer until shutdown.
    pub async fn run(mut self) {
        info!(queue = %self.queue, "SettlementConsumer started");

        let mut attempt: u32 = 0;
        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            match Connection::connect(&self.url, ConnectionProperties::default()).await {
                Ok(connection) => {
                    attempt = 0;
                    let end = self.consume(&connection).await;
                    if let Err(e) = connection.close(200, "OK").await {
                        debug!(error = %e, "Failed to close consumer connection");
                    }
                    match end {
                        Ok(SessionEnd::Shutdown) => break,
                        Ok(SessionEnd::Lost(e)) | Err(e) => {
                            warn!(error = %e, "Consumer session lost");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Failed to connect to broker");
                }
            }

            let delay = reconnect_delay(attempt);
            attempt = attempt.saturating_add(1);
            info!(delay_secs = delay.as_secs(), "Reconnecting to broker");

            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("SettlementConsumer shutdown complete");
    }

    async fn consume(&mut self, connection: &Connection) -> Result<SessionEnd, BrokerError> {
        let channel = connection.create_channel().await?;
        channel
            .basic_qos(self.prefetch, BasicQosOptions::default())
            .await?;
        declare_outcome_queue(&channel, &self.queue).await?;

        let mut consumer = channel
            .basic_consume(
                &self.queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        info!(queue = %self.queue, prefetch = self.prefetch, "Consuming outcome notifications");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("SettlementConsumer received shutdown signal");
                        return Ok(SessionEnd::Shutdown);
                    }
                }

                delivery = consumer.next() => {
                    match delivery {
                        Some(Ok(delivery)) => {
                            self.process_delivery(delivery).await?;
                            if *self.shutdown_rx.borrow() {
                                info!("SettlementConsumer received shutdown signal");
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                        Some(Err(e)) => return Ok(SessionEnd::Lost(e.into())),
                        None => return Ok(SessionEnd::Lost(BrokerError::ConsumerClosed)),
                    }
                }
            }
        }
    }

    async fn process_delivery(&mut self, delivery: Delivery) -> Result<(), BrokerError> {
        match self.handle_payload(&delivery.data).await {
            Disposition::Ack => delivery.ack(BasicAckOptions::default()).await?,
            Disposition::Requeue => {
                self.pause_before_requeue().await;
                delivery
                    .nack(BasicNackOptions {
                        requeue: true,
                        multiple: false,
                    })
                    .await?
            }
        }
        Ok(())
    }

    /// Wait out [`REQUEUE_DELAY`], or less if shutdown is requested.
    async fn pause_before_requeue(&mut self) {
        tokio::select! {
            biased;

            Ok(()) = self.shutdown_rx.changed() => {}
            _ = tokio::time::sleep(REQUEUE_DELAY) => {}
        }
    }

    /// Settle the bet a raw notification refers to and decide its fate.
    pub async fn handle_payload(&self, body: &[u8]) -> Disposition {
        let notification = match OutcomeNotification::from_slice(body) {
            Ok(notification) => notification,
            Err(e) => {
                warn!(error = %e, body = %String::from_utf8_lossy(body), "Dropping malformed notification");
                return Disposition::Ack;
            }
        };
        let event_id = notification.event_id.as_str();

        match self.bets.settle_bet(event_id, notification.status).await {
            Ok(Settlement::Applied(bet)) => {
                debug!(event_id, bet_id = bet.id, "Notification applied");
                Disposition::Ack
            }
            Ok(Settlement::AlreadySettled(bet)) => {
                debug!(event_id, bet_id = bet.id, "Duplicate notification ignored");
                Disposition::Ack
            }
            Err(e) if e.is_handled() => {
                warn!(event_id, status = notification.status, reason = %e, "Notification dropped");
                Disposition::Ack
            }
            Err(e) => {
                error!(event_id, error = %e, "Settlement failed, requeueing");
                Disposition::Requeue
            }
        }
    }
}
