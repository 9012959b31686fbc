//! Consumer for payment notifications.
//!
//! The payment provider publishes `payment.completed` with a JSON body
//! `{ "listingId": "<uuid>" }`. Each notification marks the listing SOLD;
//! repeats are harmless.

use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::common::ListingId;
use crate::domains::listings::activities::complete_payment;
use crate::domains::listings::models::Listing;
use crate::kernel::MarketplaceDeps;

pub const PAYMENT_COMPLETED_SUBJECT: &str = "payment.completed";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompleted {
    pub listing_id: ListingId,
}

/// Handle one raw notification.
///
/// Malformed payloads and failed transitions are logged and dropped; the
/// listing state after the notification is returned when there is one.
pub async fn handle_payment_completed(payload: &[u8], deps: &MarketplaceDeps) -> Option<Listing> {
    let notification: PaymentCompleted = match serde_json::from_slice(payload) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(error = %e, "Dropping malformed payment notification");
            return None;
        }
    };

    match complete_payment(notification.listing_id, deps).await {
        Ok(outcome) => Some(outcome.state),
        Err(e) => {
            error!(
                listing_id = %notification.listing_id,
                error_kind = ?e.kind(),
                error = %e,
                "Failed to apply payment notification"
            );
            None
        }
    }
}

/// Subscribe to payment notifications and apply them until the subscription ends.
pub async fn run_payment_listener(client: async_nats::Client, deps: MarketplaceDeps) -> Result<()> {
    let mut subscriber = client
        .subscribe(PAYMENT_COMPLETED_SUBJECT)
        .await
        .context("Failed to subscribe to payment notifications")?;

    info!(subject = PAYMENT_COMPLETED_SUBJECT, "Listening for payment notifications");

    while let Some(message) = subscriber.next().await {
        handle_payment_completed(&message.payload, &deps).await;
    }

    warn!("Payment notification subscription closed");
    Ok(())
}
