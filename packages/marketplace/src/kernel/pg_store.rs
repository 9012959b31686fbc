//! Postgres listing store.
//!
//! Each commit runs in one transaction. The listing row's `version` column is
//! the compare-and-swap guard for the whole aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::common::{ListingId, OfferId, UserId};
use crate::domains::listings::models::{Condition, Listing, ListingStatus};
use crate::domains::messages::models::ListingMessage;
use crate::domains::offers::models::Offer;
use crate::kernel::{BaseListingStore, Changeset, StoreError, StoreResult};

/// Unique violation: a concurrent writer won a constraint race.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: ListingId,
    seller_id: UserId,
    title: String,
    description: String,
    price: Decimal,
    condition: Condition,
    images: Vec<String>,
    tags: Vec<String>,
    status: ListingStatus,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            seller_id: row.seller_id,
            title: row.title,
            description: row.description,
            price: row.price,
            condition: row.condition,
            images: row.images,
            tags: row.tags.into_iter().collect(),
            status: row.status,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_listing(
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> StoreResult<Option<i64>> {
        let tags: Vec<&str> = listing.tags.iter().map(String::as_str).collect();

        let version = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO listings (
                id, seller_id, title, description, price, condition,
                images, tags, status, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1, $10, $11)
            ON CONFLICT (id) DO NOTHING
            RETURNING version
            "#,
        )
        .bind(listing.id)
        .bind(listing.seller_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.condition)
        .bind(&listing.images)
        .bind(&tags)
        .bind(listing.status)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(version)
    }

    async fn update_listing(
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
        expected_version: i64,
    ) -> StoreResult<Option<i64>> {
        let tags: Vec<&str> = listing.tags.iter().map(String::as_str).collect();

        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE listings
            SET title = $3,
                description = $4,
                price = $5,
                condition = $6,
                images = $7,
                tags = $8,
                status = $9,
                updated_at = $10,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(listing.id)
        .bind(expected_version)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.condition)
        .bind(&listing.images)
        .bind(&tags)
        .bind(listing.status)
        .bind(listing.updated_at)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(version)
    }

    async fn bump_version(
        tx: &mut Transaction<'_, Postgres>,
        listing_id: ListingId,
        expected_version: i64,
    ) -> StoreResult<Option<i64>> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE listings
            SET version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(listing_id)
        .bind(expected_version)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(version)
    }

    async fn upsert_offer(tx: &mut Transaction<'_, Postgres>, offer: &Offer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO offers (
                id, listing_id, buyer_id, amount, message, status,
                rejection_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET amount = EXCLUDED.amount,
                message = EXCLUDED.message,
                status = EXCLUDED.status,
                rejection_reason = EXCLUDED.rejection_reason,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(offer.id)
        .bind(offer.listing_id)
        .bind(offer.buyer_id)
        .bind(offer.amount)
        .bind(&offer.message)
        .bind(offer.status)
        .bind(offer.rejection_reason)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn insert_message(
        tx: &mut Transaction<'_, Postgres>,
        message: &ListingMessage,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listing_messages (id, listing_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.listing_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn apply(&self, changes: &Changeset) -> StoreResult<i64> {
        let listing_id = changes.listing_id;
        let mut tx = self.pool.begin().await?;

        let version = match (changes.expected_version, &changes.listing) {
            (None, Some(listing)) => Self::insert_listing(&mut tx, listing).await?,
            (None, None) => {
                return Err(StoreError::Backend(anyhow::anyhow!(
                    "insert of listing {} carries no listing row",
                    listing_id
                )))
            }
            (Some(expected), Some(listing)) => {
                Self::update_listing(&mut tx, listing, expected).await?
            }
            (Some(expected), None) => Self::bump_version(&mut tx, listing_id, expected).await?,
        };

        // Rolled back on drop
        let Some(version) = version else {
            return Err(StoreError::Conflict { listing_id });
        };

        for offer in &changes.offers {
            Self::upsert_offer(&mut tx, offer).await?;
        }
        for message in &changes.messages {
            Self::insert_message(&mut tx, message).await?;
        }

        tx.commit().await?;

        debug!(listing_id = %listing_id, version, "Committed listing aggregate");
        Ok(version)
    }
}

#[async_trait]
impl BaseListingStore for PgListingStore {
    async fn load_listing(&self, id: ListingId) -> StoreResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Listing::from))
    }

    async fn load_offers_for_listing(&self, id: ListingId) -> StoreResult<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT * FROM offers WHERE listing_id = $1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(offers)
    }

    async fn load_offer(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    async fn count_active_listings(&self, seller_id: UserId) -> StoreResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM listings
            WHERE seller_id = $1 AND status NOT IN ('SOLD', 'CANCELLED', 'EXPIRED')
            "#,
        )
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn count_messages(&self, listing_id: ListingId) -> StoreResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listing_messages WHERE listing_id = $1",
        )
        .bind(listing_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn list_expirable(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT * FROM listings
            WHERE status IN ('PENDING_APPROVAL', 'AVAILABLE') AND created_at <= $1
            ORDER BY created_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn commit(&self, changes: Changeset) -> StoreResult<i64> {
        match self.apply(&changes).await {
            Err(StoreError::Database(sqlx::Error::Database(db)))
                if db.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::Conflict {
                    listing_id: changes.listing_id,
                })
            }
            result => result,
        }
    }
}
