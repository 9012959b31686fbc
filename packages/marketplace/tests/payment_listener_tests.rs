//! Payment notifications as they arrive off the wire.

mod common;

use crate::common::{create_available_listing, place_offer, user, TestHarness};
use marketplace_core::common::ListingId;
use marketplace_core::domains::listings::ListingStatus;
use marketplace_core::domains::offers::activities::accept_offer;
use marketplace_core::kernel::{handle_payment_completed, BaseListingStore};
use serde_json::json;
use test_context::test_context;

fn notification(listing_id: ListingId) -> Vec<u8> {
    serde_json::to_vec(&json!({ "listingId": listing_id })).unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_notification_marks_listing_sold(ctx: &TestHarness) {
    let seller = user();
    let listing = create_available_listing(ctx, &seller, "Drum kit").await;
    let offer = place_offer(ctx, &listing, &user(), 300).await;
    accept_offer(offer.id, &seller, &ctx.deps).await.unwrap();

    let sold = handle_payment_completed(&notification(listing.id), &ctx.deps)
        .await
        .expect("listing should be returned");
    assert_eq!(sold.status, ListingStatus::Sold);

    // Redelivery is absorbed
    let again = handle_payment_completed(&notification(listing.id), &ctx.deps)
        .await
        .expect("listing should be returned");
    assert_eq!(again.status, ListingStatus::Sold);
    assert_eq!(ctx.nats.publish_count_for("marketplace.listing.sold"), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_payment_for_open_listing_is_ignored(ctx: &TestHarness) {
    let listing = create_available_listing(ctx, &user(), "Amp").await;

    let state = handle_payment_completed(&notification(listing.id), &ctx.deps)
        .await
        .expect("listing should be returned");
    assert_eq!(state.status, ListingStatus::Available);

    let stored = ctx.store.load_listing(listing.id).await.unwrap().unwrap();
    assert_eq!(stored.version, listing.version);
    assert!(!ctx.nats.was_published_to("marketplace.listing.sold"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_bad_notifications_are_dropped(ctx: &TestHarness) {
    assert!(handle_payment_completed(b"not json", &ctx.deps).await.is_none());
    assert!(handle_payment_completed(br#"{"orderId":"x"}"#, &ctx.deps)
        .await
        .is_none());
    assert!(
        handle_payment_completed(&notification(ListingId::new()), &ctx.deps)
            .await
            .is_none()
    );
    assert_eq!(ctx.nats.publish_count(), 0);
}
