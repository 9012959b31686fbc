//! In-process listing store.
//!
//! Same compare-and-swap contract as the Postgres store; used by tests and by
//! hosts that embed the marketplace without a database.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::{ListingId, OfferId, UserId};
use crate::domains::listings::models::{Listing, ListingStatus};
use crate::domains::messages::models::ListingMessage;
use crate::domains::offers::models::Offer;
use crate::kernel::{BaseListingStore, Changeset, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    listings: HashMap<ListingId, Listing>,
    offers: HashMap<OfferId, Offer>,
    messages: Vec<ListingMessage>,
}

#[derive(Default)]
pub struct InMemoryListingStore {
    tables: Mutex<Tables>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages stored for `listing_id`, oldest first
    pub fn messages_for(&self, listing_id: ListingId) -> Vec<ListingMessage> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables
            .messages
            .iter()
            .filter(|m| m.listing_id == listing_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseListingStore for InMemoryListingStore {
    async fn load_listing(&self, id: ListingId) -> StoreResult<Option<Listing>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.listings.get(&id).cloned())
    }

    async fn load_offers_for_listing(&self, id: ListingId) -> StoreResult<Vec<Offer>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut offers: Vec<Offer> = tables
            .offers
            .values()
            .filter(|o| o.listing_id == id)
            .cloned()
            .collect();
        offers.sort_by_key(|o| (o.created_at, o.id));
        Ok(offers)
    }

    async fn load_offer(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.offers.get(&id).cloned())
    }

    async fn count_active_listings(&self, seller_id: UserId) -> StoreResult<usize> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables
            .listings
            .values()
            .filter(|l| l.seller_id == seller_id && !l.status.is_terminal())
            .count())
    }

    async fn count_messages(&self, listing_id: ListingId) -> StoreResult<usize> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.listing_id == listing_id)
            .count())
    }

    async fn list_expirable(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut due: Vec<Listing> = tables
            .listings
            .values()
            .filter(|l| {
                matches!(
                    l.status,
                    ListingStatus::PendingApproval | ListingStatus::Available
                ) && l.created_at <= cutoff
            })
            .cloned()
            .collect();
        due.sort_by_key(|l| l.created_at);
        Ok(due)
    }

    async fn commit(&self, changes: Changeset) -> StoreResult<i64> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let listing_id = changes.listing_id;

        let version = match changes.expected_version {
            None => {
                if tables.listings.contains_key(&listing_id) {
                    return Err(StoreError::Conflict { listing_id });
                }
                let Some(mut listing) = changes.listing else {
                    return Err(StoreError::Backend(anyhow!(
                        "insert of listing {} carries no listing row",
                        listing_id
                    )));
                };
                listing.version = 1;
                tables.listings.insert(listing_id, listing);
                1
            }
            Some(expected) => {
                let current = tables
                    .listings
                    .get_mut(&listing_id)
                    .ok_or_else(|| anyhow!("listing {} does not exist", listing_id))?;
                if current.version != expected {
                    return Err(StoreError::Conflict { listing_id });
                }
                let version = expected + 1;
                if let Some(listing) = changes.listing {
                    *current = listing;
                }
                current.version = version;
                version
            }
        };

        for offer in changes.offers {
            tables.offers.insert(offer.id, offer);
        }
        tables.messages.extend(changes.messages);

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::listings::models::Condition;
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;

    fn listing() -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(),
            seller_id: UserId::new(),
            title: "Kettle".to_string(),
            description: "Electric kettle".to_string(),
            price: Decimal::new(15, 0),
            condition: Condition::Good,
            images: vec!["https://img.example.com/kettle.jpg".to_string()],
            tags: BTreeSet::new(),
            status: ListingStatus::Available,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let store = InMemoryListingStore::new();
        let listing = listing();
        store
            .commit(Changeset::insert_listing(listing.clone()))
            .await
            .unwrap();

        let loaded = store.load_listing(listing.id).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);

        let v2 = store.commit(Changeset::for_listing(&loaded)).await.unwrap();
        assert_eq!(v2, 2);

        let err = store
            .commit(Changeset::for_listing(&loaded))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn inserting_twice_is_a_conflict() {
        let store = InMemoryListingStore::new();
        let listing = listing();
        store
            .commit(Changeset::insert_listing(listing.clone()))
            .await
            .unwrap();

        let err = store
            .commit(Changeset::insert_listing(listing))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn terminal_listings_do_not_count_as_active() {
        let store = InMemoryListingStore::new();
        let open = listing();
        let mut sold = listing();
        sold.seller_id = open.seller_id;
        sold.status = ListingStatus::Sold;

        store.commit(Changeset::insert_listing(open.clone())).await.unwrap();
        store.commit(Changeset::insert_listing(sold)).await.unwrap();

        assert_eq!(store.count_active_listings(open.seller_id).await.unwrap(), 1);
    }
}
