//! Marketplace dependencies for activities (using traits for testability)
//!
//! This module provides the dependency container every activity runs against.
//! Storage, event publication and time all sit behind trait objects.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::common::{EntityKind, ListingId, MarketplaceError, MarketplaceResult, OfferId};
use crate::config::MarketplaceConfig;
use crate::domains::events::MarketplaceEvent;
use crate::domains::listings::models::Listing;
use crate::domains::offers::models::Offer;
use crate::kernel::{publish_events, BaseClock, BaseListingStore, Changeset, NatsPublisher};

/// Marketplace dependencies accessible to activities
#[derive(Clone)]
pub struct MarketplaceDeps {
    pub store: Arc<dyn BaseListingStore>,
    pub nats: Arc<dyn NatsPublisher>,
    pub clock: Arc<dyn BaseClock>,
    /// Validated once at startup; immutable afterwards
    pub config: Arc<MarketplaceConfig>,
}

impl MarketplaceDeps {
    pub fn new(
        store: Arc<dyn BaseListingStore>,
        nats: Arc<dyn NatsPublisher>,
        clock: Arc<dyn BaseClock>,
        config: MarketplaceConfig,
    ) -> Self {
        Self {
            store,
            nats,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// How many times a conflicting commit is re-run
    pub fn commit_retries(&self) -> u32 {
        self.config.lifecycle.commit_retries
    }

    /// Load a listing snapshot or fail with `NotFound`
    pub async fn listing(&self, id: ListingId) -> MarketplaceResult<Listing> {
        self.store
            .load_listing(id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found(EntityKind::Listing, id))
    }

    /// Load an offer snapshot or fail with `NotFound`
    pub async fn offer(&self, id: OfferId) -> MarketplaceResult<Offer> {
        self.store
            .load_offer(id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found(EntityKind::Offer, id))
    }

    /// Commit a changeset; returns the listing's new version.
    pub async fn commit(&self, changes: Changeset) -> MarketplaceResult<i64> {
        Ok(self.store.commit(changes).await?)
    }

    /// Publish committed events. Never fails.
    pub async fn publish(&self, events: &[MarketplaceEvent]) {
        publish_events(self.nats.as_ref(), events).await;
    }
}
