//! Event publication over NATS.
//!
//! Domain events are published as JSON with their dotted name as the subject
//! (`marketplace.offer.accepted`, ...). Swapping [`NatsClientPublisher`] for
//! [`TestNats`] lets tests inspect what would have gone out.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::domains::events::MarketplaceEvent;

/// One message as it left the process.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

#[async_trait]
pub trait NatsPublisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

/// Publishes through a connected `async_nats::Client`.
pub struct NatsClientPublisher {
    client: async_nats::Client,
}

impl NatsClientPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NatsPublisher for NatsClientPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        Ok(())
    }
}

/// Publish committed events in order.
///
/// The state they describe is already stored, so a failed publish is logged
/// and skipped rather than reported to the caller. Returns how many went out.
pub async fn publish_events(publisher: &dyn NatsPublisher, events: &[MarketplaceEvent]) -> usize {
    let mut published = 0;

    for event in events {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                warn!(event = event.name(), error = %e, "Failed to serialize event");
                continue;
            }
        };

        match publisher.publish(event.name().to_string(), payload).await {
            Ok(()) => {
                debug!(event = event.name(), "Published event");
                published += 1;
            }
            Err(e) => warn!(event = event.name(), error = %e, "Failed to publish event"),
        }
    }

    published
}

/// In-process publisher that keeps everything it is handed.
#[derive(Default)]
pub struct TestNats {
    outbox: Mutex<Vec<PublishedMessage>>,
}

impl TestNats {
    pub fn new() -> Self {
        Self::default()
    }

    fn outbox(&self) -> MutexGuard<'_, Vec<PublishedMessage>> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subjects in publish order
    pub fn subjects(&self) -> Vec<String> {
        self.outbox().iter().map(|m| m.subject.clone()).collect()
    }

    /// JSON bodies sent on `subject`, oldest first
    pub fn payloads_for(&self, subject: &str) -> Vec<serde_json::Value> {
        self.outbox()
            .iter()
            .filter(|m| m.subject == subject)
            .filter_map(|m| serde_json::from_slice(&m.payload).ok())
            .collect()
    }

    pub fn was_published_to(&self, subject: &str) -> bool {
        self.publish_count_for(subject) > 0
    }

    pub fn publish_count(&self) -> usize {
        self.outbox().len()
    }

    pub fn publish_count_for(&self, subject: &str) -> usize {
        self.outbox().iter().filter(|m| m.subject == subject).count()
    }

    /// Forget everything sent so far
    pub fn clear(&self) {
        self.outbox().clear();
    }
}

#[async_trait]
impl NatsPublisher for TestNats {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.outbox().push(PublishedMessage { subject, payload });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ListingId;
    use crate::domains::listings::events::ListingEvent;

    struct Unreachable;

    #[async_trait]
    impl NatsPublisher for Unreachable {
        async fn publish(&self, _subject: String, _payload: Bytes) -> Result<()> {
            Err(anyhow::anyhow!("no responders"))
        }
    }

    fn sold_and_expired(listing_id: ListingId) -> Vec<MarketplaceEvent> {
        vec![
            ListingEvent::ListingSold { listing_id }.into(),
            ListingEvent::ListingExpired { listing_id }.into(),
        ]
    }

    #[tokio::test]
    async fn events_go_out_under_their_names_in_order() {
        let outbox = TestNats::new();
        let listing_id = ListingId::new();

        assert_eq!(publish_events(&outbox, &sold_and_expired(listing_id)).await, 2);
        assert_eq!(
            outbox.subjects(),
            vec!["marketplace.listing.sold", "marketplace.listing.expired"]
        );

        let body = &outbox.payloads_for("marketplace.listing.sold")[0];
        assert_eq!(body["type"], "marketplace.listing.sold");
        assert_eq!(body["listingId"], listing_id.to_string());
    }

    #[tokio::test]
    async fn clearing_resets_the_counts() {
        let outbox = TestNats::new();
        publish_events(&outbox, &sold_and_expired(ListingId::new())).await;
        assert_eq!(outbox.publish_count_for("marketplace.listing.expired"), 1);

        outbox.clear();
        assert_eq!(outbox.publish_count(), 0);
        assert!(!outbox.was_published_to("marketplace.listing.sold"));
    }

    #[tokio::test]
    async fn unreachable_server_publishes_nothing() {
        let events = sold_and_expired(ListingId::new());
        assert_eq!(publish_events(&Unreachable, &events).await, 0);
    }
}
