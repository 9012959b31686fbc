//! Postgres store against a real database.
//!
//! Uses one shared container for the whole file. These tests need Docker:
//! cargo test --test pg_store_tests -- --ignored

mod common;

use crate::common::{listing_input, moderator, offer_input, user};
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use marketplace_core::common::ErrorKind;
use marketplace_core::domains::listings::activities::{
    approve_listing, complete_payment, create_listing,
};
use marketplace_core::domains::listings::ListingStatus;
use marketplace_core::domains::messages::activities::post_message;
use marketplace_core::domains::messages::MessageInput;
use marketplace_core::domains::offers::activities::{accept_offer, create_offer};
use marketplace_core::domains::offers::{OfferStatus, RejectionReason};
use marketplace_core::kernel::{
    BaseListingStore, Changeset, FixedClock, MarketplaceDeps, PgListingStore, StoreError,
    TestNats,
};
use marketplace_core::MarketplaceConfig;
use sqlx::PgPool;
use std::sync::Arc;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct SharedDatabase {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_DB: OnceCell<SharedDatabase> = OnceCell::const_new();

impl SharedDatabase {
    async fn init() -> Result<Self> {
        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_DB
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test database")
            })
            .await
    }
}

struct PgContext {
    store: Arc<PgListingStore>,
    nats: Arc<TestNats>,
    deps: MarketplaceDeps,
}

async fn pg_context() -> PgContext {
    let shared = SharedDatabase::get().await;
    let pool = PgPool::connect(&shared.db_url)
        .await
        .expect("Failed to connect to test database");

    let store = Arc::new(PgListingStore::new(pool));
    let nats = Arc::new(TestNats::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let deps = MarketplaceDeps::new(
        store.clone(),
        nats.clone(),
        clock,
        MarketplaceConfig::default(),
    );

    PgContext { store, nats, deps }
}

#[tokio::test]
#[ignore = "starts a Postgres container"]
async fn test_listing_round_trips_through_postgres() {
    let ctx = pg_context().await;
    let seller = user();

    let created = create_listing(listing_input("Bookcase"), &seller, &ctx.deps)
        .await
        .unwrap();
    let approved = approve_listing(created.state.id, &moderator(), &ctx.deps)
        .await
        .unwrap();

    let stored = ctx.store.load_listing(created.state.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ListingStatus::Available);
    assert_eq!(stored.version, approved.state.version);
    assert_eq!(stored.tags, created.state.tags);
    assert_eq!(ctx.store.count_active_listings(seller.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "starts a Postgres container"]
async fn test_stale_version_is_a_conflict() {
    let ctx = pg_context().await;
    let created = create_listing(listing_input("Stool"), &user(), &ctx.deps)
        .await
        .unwrap();
    let snapshot = created.state;

    let mut first = snapshot.clone();
    first.title = "Bar stool".to_string();
    ctx.store
        .commit(Changeset::for_listing(&snapshot).with_listing(first))
        .await
        .unwrap();

    let mut second = snapshot.clone();
    second.title = "Kitchen stool".to_string();
    let err = ctx
        .store
        .commit(Changeset::for_listing(&snapshot).with_listing(second))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let stored = ctx.store.load_listing(snapshot.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Bar stool");
}

#[tokio::test]
#[ignore = "starts a Postgres container"]
async fn test_sale_persists_offers_and_messages() {
    let ctx = pg_context().await;
    let seller = user();
    let created = create_listing(listing_input("Telescope"), &seller, &ctx.deps)
        .await
        .unwrap();
    let listing = approve_listing(created.state.id, &moderator(), &ctx.deps)
        .await
        .unwrap()
        .state;

    post_message(listing.id, MessageInput::new("Any scratches?"), &user(), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(ctx.store.count_messages(listing.id).await.unwrap(), 1);

    let first = create_offer(listing.id, offer_input(400), &user(), &ctx.deps)
        .await
        .unwrap()
        .state;
    let second = create_offer(listing.id, offer_input(420), &user(), &ctx.deps)
        .await
        .unwrap()
        .state;

    accept_offer(second.id, &seller, &ctx.deps).await.unwrap();

    let first = ctx.store.load_offer(first.id).await.unwrap().unwrap();
    assert_eq!(first.status, OfferStatus::Rejected);
    assert_eq!(first.rejection_reason, Some(RejectionReason::Superseded));

    let err = accept_offer(first.id, &seller, &ctx.deps).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let sold = complete_payment(listing.id, &ctx.deps).await.unwrap();
    assert_eq!(sold.state.status, ListingStatus::Sold);
    assert_eq!(ctx.store.count_active_listings(seller.id).await.unwrap(), 0);
    assert!(ctx.nats.was_published_to("marketplace.listing.sold"));
}
