//! NotificationSender processor.
//!
//! The NotificationSender is responsible for:
//! - Receiving `NotificationEvent` from the queue
//! - Loading the payment and the payer
//! - Composing a plain text email for the outcome
//! - Posting it to the email API, or logging it when email is disabled
//!
//! Delivery is best-effort: failures are logged and dropped.

use crate::config::EmailConfig;
use crate::entities::payments::{GetPaymentById, PaymentRecord};
use crate::entities::users::{GetUserById, UserRecord};
use crate::entities::{PaymentPurpose, PaymentStatus};
use crate::events::{NotificationEvent, NotificationEventReceiver};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payment not found: {0}")]
    PaymentNotFound(Uuid),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("email API answered {status}: {body}")]
    DeliveryFailed { status: u16, body: String },
}

/// A composed plain text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Compose the email for a payment outcome.
///
/// Returns `None` for statuses that do not warrant an email.
pub fn compose_email(payment: &PaymentRecord, user: &UserRecord) -> Option<Email> {
    let what = format!(
        "{} ({} {}, order {})",
        payment.description, payment.amount, payment.currency, payment.order_id
    );

    let (subject, body) = match payment.status {
        PaymentStatus::Success => {
            let effect = match payment.purpose {
                PaymentPurpose::Membership => match user.membership_expires_at {
                    Some(expires_at) => {
                        format!("Your membership is now valid until {}.", expires_at.date())
                    }
                    None => "Your membership has been extended.".to_string(),
                },
                PaymentPurpose::Competition => {
                    "Your competition registration is confirmed.".to_string()
                }
            };
            (
                "Payment received",
                format!("We have received your payment for {what}.\n\n{effect}"),
            )
        }
        PaymentStatus::Failed => {
            let reason = payment
                .failure_reason
                .as_deref()
                .unwrap_or("the payment was declined");
            (
                "Payment failed",
                format!(
                    "Your payment for {what} could not be completed: {reason}.\n\n\
                     You can start a new payment from the portal."
                ),
            )
        }
        PaymentStatus::Expired => (
            "Payment expired",
            format!(
                "Your payment for {what} was not completed in time and has expired.\n\n\
                 You can start a new payment from the portal."
            ),
        ),
        PaymentStatus::Cancelled => (
            "Payment cancelled",
            format!("Your payment for {what} has been cancelled."),
        ),
        PaymentStatus::Pending | PaymentStatus::Processing => return None,
    };

    Some(Email {
        to: user.email.clone(),
        subject: subject.to_string(),
        text: format!("Hello {},\n\n{body}\n", user.full_name),
    })
}

/// NotificationSender delivers payment outcome emails.
pub struct NotificationSender {
    db: DatabaseProcessor,
    config: Arc<RwLock<EmailConfig>>,
    notification_rx: NotificationEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
    http_client: reqwest::Client,
}

impl NotificationSender {
    pub fn new(
        db: DatabaseProcessor,
        config: Arc<RwLock<EmailConfig>>,
        notification_rx: NotificationEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            config,
            notification_rx,
            shutdown_rx,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Run the NotificationSender.
    pub async fn run(mut self) {
        info!("NotificationSender started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("NotificationSender received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.notification_rx.recv() => {
                    debug!(event = ?event, "Received NotificationEvent");

                    if let Err(e) = self.process_event(&event).await {
                        error!(
                            payment_id = %event.payment_id(),
                            error = %e,
                            "Failed to send payment notification"
                        );
                    }
                }

                else => {
                    info!("NotificationEvent channel closed");
                    break;
                }
            }
        }

        info!("NotificationSender shutdown complete");
    }

    async fn process_event(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let NotificationEvent::PaymentStatusChanged {
            payment_id,
            new_status,
        } = event;

        let payment = self
            .db
            .process(GetPaymentById { id: *payment_id })
            .await?
            .ok_or(NotificationError::PaymentNotFound(*payment_id))?;
        if payment.status != *new_status {
            // a later transition will send its own email
            debug!(
                payment_id = %payment_id,
                event_status = ?new_status,
                current_status = ?payment.status,
                "Skipping stale notification"
            );
            return Ok(());
        }
        let user = self
            .db
            .process(GetUserById { id: payment.user_id })
            .await?
            .ok_or(NotificationError::UserNotFound(payment.user_id))?;

        let Some(email) = compose_email(&payment, &user) else {
            return Ok(());
        };
        self.deliver(&email).await?;
        info!(
            payment_id = %payment_id,
            status = ?new_status,
            "Payment notification sent"
        );
        Ok(())
    }

    async fn deliver(&self, email: &Email) -> Result<(), NotificationError> {
        let config = self.config.read().await.clone();
        if !config.enabled {
            info!(
                to = %email.to,
                subject = %email.subject,
                text = %email.text,
                "Email disabled, logging notification"
            );
            return Ok(());
        }

        let response = self
            .http_client
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&EmailRequest {
                from: &config.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.text,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Email API rejected the message");
            Err(NotificationError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}
