// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Lifecycle rules live in the domain actions; these traits only load and store snapshots.
//
// Naming convention: Base* for trait names (e.g., BaseListingStore, BaseClock)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;
use thiserror::Error;

use crate::common::{ListingId, MarketplaceError, OfferId, UserId};
use crate::domains::listings::models::Listing;
use crate::domains::messages::models::ListingMessage;
use crate::domains::offers::models::Offer;

// =============================================================================
// Storage Trait (Infrastructure - listing aggregate persistence)
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    /// The aggregate moved on since the snapshot was loaded
    #[error("Listing {listing_id} was modified concurrently")]
    Conflict { listing_id: ListingId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<StoreError> for MarketplaceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { listing_id } => MarketplaceError::Conflict { listing_id },
            StoreError::Database(e) => MarketplaceError::Internal(e.into()),
            StoreError::Backend(e) => MarketplaceError::Internal(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything one engine decision changes on a listing aggregate.
///
/// Committed as a unit: either every row lands or none does.
#[derive(Debug, Clone)]
pub struct Changeset {
    pub listing_id: ListingId,
    /// Version the snapshot was loaded at; `None` inserts a new listing
    pub expected_version: Option<i64>,
    /// New listing snapshot, when the listing row itself changed
    pub listing: Option<Listing>,
    /// Offers to insert or overwrite
    pub offers: Vec<Offer>,
    /// Messages to insert
    pub messages: Vec<ListingMessage>,
}

impl Changeset {
    /// Changeset guarded by the version `listing` was loaded at.
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id,
            expected_version: Some(listing.version),
            listing: None,
            offers: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Insert a listing that did not exist before.
    pub fn insert_listing(listing: Listing) -> Self {
        Self {
            listing_id: listing.id,
            expected_version: None,
            listing: Some(listing),
            offers: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_listing(mut self, listing: Listing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_offers(mut self, offers: impl IntoIterator<Item = Offer>) -> Self {
        self.offers.extend(offers);
        self
    }

    pub fn with_message(mut self, message: ListingMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Persistence of listing aggregates (a listing plus its offers and messages).
///
/// Every commit bumps the listing's `version` by one and fails with
/// [`StoreError::Conflict`] when `expected_version` no longer matches.
#[async_trait]
pub trait BaseListingStore: Send + Sync {
    async fn load_listing(&self, id: ListingId) -> StoreResult<Option<Listing>>;

    async fn load_offers_for_listing(&self, id: ListingId) -> StoreResult<Vec<Offer>>;

    async fn load_offer(&self, id: OfferId) -> StoreResult<Option<Offer>>;

    /// Non-terminal listings held by `seller_id`
    async fn count_active_listings(&self, seller_id: UserId) -> StoreResult<usize>;

    async fn count_messages(&self, listing_id: ListingId) -> StoreResult<usize>;

    /// Listings in an expirable status created at or before `cutoff`
    async fn list_expirable(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    /// Apply `changes` atomically and return the listing's new version.
    async fn commit(&self, changes: Changeset) -> StoreResult<i64>;
}

// =============================================================================
// Clock Trait (Infrastructure - time source)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to an instant until moved with [`FixedClock::advance`].
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl BaseClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_stay_retryable_after_conversion() {
        let listing_id = ListingId::new();
        let err: MarketplaceError = StoreError::Conflict { listing_id }.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn backend_failures_become_internal() {
        let err: MarketplaceError = StoreError::Backend(anyhow::anyhow!("disk full")).into();
        assert_eq!(err.kind(), crate::common::ErrorKind::Internal);
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::days(2));
        assert_eq!(clock.now(), start + chrono::Duration::days(2));
    }
}
