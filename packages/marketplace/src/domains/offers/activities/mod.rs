//! Offer activities.
//!
//! Every offer write commits under its listing's version, so offer creation
//! and acceptance on one listing are serialized against each other.

use tracing::info;

use crate::common::auth::Actor;
use crate::common::{ListingId, MarketplaceError, MarketplaceResult, OfferId, Outcome};
use crate::domains::offers::actions::{self as offer_actions, Acceptance};
use crate::domains::offers::data::{OfferInput, OfferPatch};
use crate::domains::offers::models::Offer;
use crate::kernel::{with_conflict_retry, Changeset, MarketplaceDeps};

/// Place an offer on a listing.
pub async fn create_offer(
    listing_id: ListingId,
    input: OfferInput,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Offer>> {
    info!(listing_id = %listing_id, buyer_id = %actor.id, "Creating offer");

    let valid = input.validate()?;
    let valid = &valid;

    let outcome = with_conflict_retry("create_offer", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let offers = deps.store.load_offers_for_listing(listing_id).await?;
        let open = offers.iter().filter(|o| o.is_open()).count();

        let outcome = offer_actions::create_offer(
            &listing,
            actor,
            valid.clone(),
            open,
            &deps.config,
            deps.now(),
        )?;

        deps.commit(Changeset::for_listing(&listing).with_offers([outcome.state.clone()]))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Accept an offer: the offer, the listing reservation and every superseded
/// offer land in one commit.
pub async fn accept_offer(
    offer_id: OfferId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Acceptance>> {
    info!(offer_id = %offer_id, "Accepting offer");

    let outcome = with_conflict_retry("accept_offer", deps.commit_retries(), move || async move {
        let offer = deps.offer(offer_id).await?;
        let listing = deps.listing(offer.listing_id).await?;
        let siblings = deps.store.load_offers_for_listing(listing.id).await?;

        let mut outcome = offer_actions::accept_offer(
            &offer,
            &listing,
            &siblings,
            actor,
            &deps.config,
            deps.now(),
        )?;

        let acceptance = &outcome.state;
        let changes = Changeset::for_listing(&listing)
            .with_listing(acceptance.listing.clone())
            .with_offers([acceptance.accepted.clone()])
            .with_offers(acceptance.superseded.iter().cloned());
        outcome.state.listing.version = deps.commit(changes).await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

pub async fn reject_offer(
    offer_id: OfferId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Offer>> {
    info!(offer_id = %offer_id, "Rejecting offer");

    let outcome = with_conflict_retry("reject_offer", deps.commit_retries(), move || async move {
        let offer = deps.offer(offer_id).await?;
        let listing = deps.listing(offer.listing_id).await?;

        let outcome =
            offer_actions::reject_offer(&offer, &listing, actor, &deps.config, deps.now())?;

        deps.commit(Changeset::for_listing(&listing).with_offers([outcome.state.clone()]))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Buyer revises the terms of a pending offer.
pub async fn update_offer(
    offer_id: OfferId,
    patch: OfferPatch,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Offer>> {
    info!(offer_id = %offer_id, "Updating offer");

    let valid = patch.validate()?;
    let valid = &valid;

    let outcome = with_conflict_retry("update_offer", deps.commit_retries(), move || async move {
        let offer = deps.offer(offer_id).await?;
        let listing = deps.listing(offer.listing_id).await?;

        let outcome = offer_actions::update_offer(
            &offer,
            &listing,
            actor,
            valid.clone(),
            &deps.config,
            deps.now(),
        )?;

        deps.commit(Changeset::for_listing(&listing).with_offers([outcome.state.clone()]))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Buyer withdraws a pending offer.
pub async fn cancel_offer(
    offer_id: OfferId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Offer>> {
    info!(offer_id = %offer_id, "Cancelling offer");

    let outcome = with_conflict_retry("cancel_offer", deps.commit_retries(), move || async move {
        let offer = deps.offer(offer_id).await?;
        let listing = deps.listing(offer.listing_id).await?;

        let outcome =
            offer_actions::cancel_offer(&offer, &listing, actor, &deps.config, deps.now())?;

        deps.commit(Changeset::for_listing(&listing).with_offers([outcome.state.clone()]))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}
