//! Listing CRUD activities - entry-point functions for listing operations
//!
//! Each activity validates raw input, then loads the snapshot, runs the
//! engine and commits under the listing's version. A conflicting commit
//! re-runs the whole cycle on a fresh snapshot. Events go out only after commit.

use tracing::info;

use crate::common::auth::Actor;
use crate::common::{ListingId, MarketplaceError, MarketplaceResult, Outcome};
use crate::domains::listings::actions as listing_actions;
use crate::domains::listings::data::{ListingInput, ListingPatch};
use crate::domains::listings::models::Listing;
use crate::domains::offers::actions::close_pending_offers;
use crate::domains::offers::models::RejectionReason;
use crate::kernel::{with_conflict_retry, Changeset, MarketplaceDeps};

/// Create a listing for the calling seller.
pub async fn create_listing(
    input: ListingInput,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(seller_id = %actor.id, title = %input.title, "Creating listing");

    let valid = input.validate(&deps.config.limits)?;
    let valid = &valid;

    let outcome = with_conflict_retry("create_listing", deps.commit_retries(), move || async move {
        let active = deps.store.count_active_listings(actor.id).await?;
        let mut outcome = listing_actions::create_listing(
            actor,
            valid.clone(),
            active,
            &deps.config,
            deps.now(),
        )?;

        outcome.state.version = deps
            .commit(Changeset::insert_listing(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Hand a draft to review.
pub async fn submit_listing(
    listing_id: ListingId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(listing_id = %listing_id, "Submitting listing");

    let outcome = with_conflict_retry("submit_listing", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let mut outcome =
            listing_actions::submit_listing(&listing, actor, &deps.config, deps.now())?;

        outcome.state.version = deps
            .commit(Changeset::for_listing(&listing).with_listing(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

pub async fn approve_listing(
    listing_id: ListingId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(listing_id = %listing_id, approved_by = %actor.id, "Approving listing");

    let outcome = with_conflict_retry("approve_listing", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let mut outcome =
            listing_actions::approve_listing(&listing, actor, &deps.config, deps.now())?;

        outcome.state.version = deps
            .commit(Changeset::for_listing(&listing).with_listing(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Apply a seller's content patch.
pub async fn update_listing(
    listing_id: ListingId,
    patch: ListingPatch,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(listing_id = %listing_id, "Updating listing");

    let valid = patch.validate(&deps.config.limits)?;
    let valid = &valid;

    let outcome = with_conflict_retry("update_listing", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let mut outcome = listing_actions::update_listing(
            &listing,
            actor,
            valid.clone(),
            &deps.config,
            deps.now(),
        )?;

        outcome.state.version = deps
            .commit(Changeset::for_listing(&listing).with_listing(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Cancel a listing and close its pending offers.
pub async fn cancel_listing(
    listing_id: ListingId,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(listing_id = %listing_id, cancelled_by = %actor.id, "Cancelling listing");

    let outcome = with_conflict_retry("cancel_listing", deps.commit_retries(), move || async move {
        let now = deps.now();
        let listing = deps.listing(listing_id).await?;
        let offers = deps.store.load_offers_for_listing(listing_id).await?;

        let mut outcome = listing_actions::cancel_listing(&listing, actor, &deps.config, now)?;
        let closed = close_pending_offers(&offers, RejectionReason::ListingClosed, now);
        outcome.events.extend(closed.events);

        outcome.state.version = deps
            .commit(
                Changeset::for_listing(&listing)
                    .with_listing(outcome.state.clone())
                    .with_offers(closed.state),
            )
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}
