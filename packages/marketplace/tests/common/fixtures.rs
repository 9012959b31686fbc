//! Test fixtures for creating test data.
//!
//! These fixtures go through the public activities, so every listing they
//! return was validated, committed and published like a real one.

use marketplace_core::common::auth::Actor;
use marketplace_core::common::UserId;
use marketplace_core::domains::listings::activities::{approve_listing, create_listing};
use marketplace_core::domains::listings::{Listing, ListingInput};
use marketplace_core::domains::messages::MessageInput;
use marketplace_core::domains::offers::activities::create_offer;
use marketplace_core::domains::offers::{Offer, OfferInput};
use rust_decimal::Decimal;

use super::TestHarness;

pub fn user() -> Actor {
    Actor::new(UserId::new(), "user")
}

pub fn moderator() -> Actor {
    Actor::new(UserId::new(), "moderator")
}

pub fn listing_input(title: &str) -> ListingInput {
    ListingInput::builder()
        .title(title)
        .description("Lightly used, collection only")
        .price(Decimal::new(150, 0))
        .condition("GOOD")
        .images(vec!["https://img.example.com/item.jpg".to_string()])
        .tags(vec!["Home".to_string()])
        .build()
}

pub fn message(text: &str) -> MessageInput {
    MessageInput::new(text)
}

pub fn offer_input(amount: i64) -> OfferInput {
    OfferInput::builder().amount(Decimal::new(amount, 0)).build()
}

/// Create a listing for `seller` and have a moderator approve it.
pub async fn create_available_listing(ctx: &TestHarness, seller: &Actor, title: &str) -> Listing {
    let created = create_listing(listing_input(title), seller, &ctx.deps)
        .await
        .expect("Failed to create listing");

    approve_listing(created.state.id, &moderator(), &ctx.deps)
        .await
        .expect("Failed to approve listing")
        .state
}

pub async fn place_offer(ctx: &TestHarness, listing: &Listing, buyer: &Actor, amount: i64) -> Offer {
    create_offer(listing.id, offer_input(amount), buyer, &ctx.deps)
        .await
        .expect("Failed to create offer")
        .state
}
