//! ExpiryWatcher processor.
//!
//! The ExpiryWatcher is responsible for:
//! - Periodically expiring `pending` payments past their `expires_at`
//! - Emitting `NotificationEvent::PaymentStatusChanged` for each of them
//! - Picking up a new sweep interval after a config reload

use crate::config::{ConfigStore, PaymentsConfig};
use crate::entities::PaymentStatus;
use crate::entities::payments::ExpireOverduePayments;
use crate::events::{EventSenders, NotificationEvent};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Lower bound for the sweep interval.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub struct ExpiryWatcher {
    db: DatabaseProcessor,
    payments_config: ConfigStore<PaymentsConfig>,
    event_senders: EventSenders,
    shutdown_rx: watch::Receiver<bool>,
}

impl ExpiryWatcher {
    pub fn new(
        db: DatabaseProcessor,
        payments_config: ConfigStore<PaymentsConfig>,
        event_senders: EventSenders,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            payments_config,
            event_senders,
            shutdown_rx,
        }
    }

    /// Run the ExpiryWatcher.
    pub async fn run(mut self) {
        info!("ExpiryWatcher started");

        let mut config_watcher = self.payments_config.subscribe();
        let mut ticker = self.ticker().await;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("ExpiryWatcher received shutdown signal");
                        break;
                    }
                }

                changed = config_watcher.changed() => {
                    if changed.is_err() {
                        info!("Payments config store dropped");
                        break;
                    }
                    ticker = self.ticker().await;
                    info!(interval = ?ticker.period(), "Expiry sweep interval reloaded");
                }

                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(0) => debug!("No overdue payments"),
                        Ok(expired) => info!(expired, "Expired overdue payments"),
                        Err(e) => error!(error = %e, "Failed to expire overdue payments"),
                    }
                }
            }
        }

        info!("ExpiryWatcher shutdown complete");
    }

    async fn ticker(&self) -> Interval {
        let period = self
            .payments_config
            .read()
            .await
            .expiry_sweep_interval
            .max(MIN_SWEEP_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Expire overdue payments once and return how many were expired.
    pub async fn sweep(&self) -> Result<usize, sqlx::Error> {
        let expired = self
            .db
            .process(ExpireOverduePayments {
                now: time::OffsetDateTime::now_utc(),
            })
            .await?;

        for payment_id in &expired {
            self.event_senders
                .notify(NotificationEvent::PaymentStatusChanged {
                    payment_id: *payment_id,
                    new_status: PaymentStatus::Expired,
                });
        }
        Ok(expired.len())
    }
}
