//! Listing transitions driven by the outside world: payment notifications and time.

use tracing::{info, warn};

use crate::common::{ErrorKind, ListingId, MarketplaceError, MarketplaceResult, Outcome};
use crate::domains::listings::actions as listing_actions;
use crate::domains::listings::models::Listing;
use crate::domains::offers::actions::close_pending_offers;
use crate::domains::offers::models::RejectionReason;
use crate::kernel::{with_conflict_retry, Changeset, MarketplaceDeps};

/// Mark a reserved listing SOLD after `payment.completed`.
///
/// Duplicate or stray notifications leave the listing untouched and succeed.
pub async fn complete_payment(
    listing_id: ListingId,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    info!(listing_id = %listing_id, "Payment completed");

    let outcome = with_conflict_retry("complete_payment", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let mut outcome = listing_actions::mark_sold(&listing, deps.now());
        if outcome.events.is_empty() {
            return Ok(outcome);
        }

        outcome.state.version = deps
            .commit(Changeset::for_listing(&listing).with_listing(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}

/// Expire one listing that outlived its time-to-live, closing its pending offers.
pub async fn expire_listing(
    listing_id: ListingId,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<Listing>> {
    let outcome = with_conflict_retry("expire_listing", deps.commit_retries(), move || async move {
        let now = deps.now();
        let listing = deps.listing(listing_id).await?;
        let offers = deps.store.load_offers_for_listing(listing_id).await?;

        let mut outcome =
            listing_actions::expire_listing(&listing, now, deps.config.lifecycle.listing_ttl())?;
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

/// Expire every listing that is due. Returns how many were expired.
///
/// A listing that moved on between the scan and its commit (approved into a
/// sale, cancelled, ...) is skipped.
pub async fn expire_due_listings(deps: &MarketplaceDeps) -> MarketplaceResult<usize> {
    let cutoff = deps.now() - deps.config.lifecycle.listing_ttl();
    let due = deps.store.list_expirable(cutoff).await?;

    let mut expired = 0;
    for listing in due {
        match expire_listing(listing.id, deps).await {
            Ok(_) => expired += 1,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidTransition | ErrorKind::Conflict) => {
                warn!(listing_id = %listing.id, error = %e, "Skipping listing during expiry sweep");
            }
            Err(e) => return Err(e),
        }
    }

    if expired > 0 {
        info!(expired, "Expired listings");
    }
    Ok(expired)
}
