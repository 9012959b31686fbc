//! Listing lifecycle engine.
//!
//! Every function takes the current snapshot plus the requested change and
//! returns the next snapshot with the events it produced, or a typed failure.
//! Nothing here touches storage or the clock; `now` is supplied by the caller.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::common::auth::{Actor, MarketplaceAction, Resource};
use crate::common::{
    EntityKind, LimitKind, ListingId, MarketplaceError, MarketplaceResult, Outcome,
};
use crate::config::MarketplaceConfig;
use crate::domains::events::MarketplaceEvent;
use crate::domains::listings::data::{ValidListing, ValidListingPatch};
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::machines::{is_editable, ListingTransition};
use crate::domains::listings::models::{Listing, ListingStatus};

/// Create a listing for `actor`.
///
/// `active_listings` is the number of non-terminal listings the seller already holds.
pub fn create_listing(
    actor: &Actor,
    input: ValidListing,
    active_listings: usize,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    actor
        .can(MarketplaceAction::CreateListing)
        .check(&config.roles)?;

    let max = config.limits.max_listings_per_user;
    if active_listings >= max {
        return Err(MarketplaceError::LimitExceeded {
            limit: LimitKind::ListingsPerUser,
            max,
            current: active_listings,
        });
    }

    let status = if input.draft {
        ListingStatus::Draft
    } else if config.features.auto_approval {
        ListingStatus::Available
    } else {
        ListingStatus::PendingApproval
    };

    let listing = Listing {
        id: ListingId::new(),
        seller_id: actor.id,
        title: input.title,
        description: input.description,
        price: input.price,
        condition: input.condition,
        images: input.images,
        tags: input.tags,
        status,
        version: 0,
        created_at: now,
        updated_at: now,
    };

    info!(listing_id = %listing.id, seller_id = %actor.id, status = %status, "Listing created");

    let event = ListingEvent::ListingCreated {
        listing: listing.clone(),
    };
    Ok(Outcome::new(listing, vec![event.into()]))
}

/// Hand a draft to the approval queue, or straight to AVAILABLE under auto-approval.
pub fn submit_listing(
    listing: &Listing,
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    actor
        .can(MarketplaceAction::SubmitListing)
        .on(Resource::Listing {
            seller_id: listing.seller_id,
        })
        .check(&config.roles)?;

    let mut next = listing.clone();
    next.status = ListingTransition::Submit.apply(listing.status)?;
    next.updated_at = now;

    let mut events: Vec<MarketplaceEvent> = vec![ListingEvent::ListingSubmitted {
        listing_id: listing.id,
        seller_id: listing.seller_id,
    }
    .into()];

    if config.features.auto_approval {
        next.status = ListingTransition::Approve.apply(next.status)?;
        events.push(
            ListingEvent::ListingApproved {
                listing_id: listing.id,
                approved_by: actor.id,
            }
            .into(),
        );
    }

    info!(listing_id = %listing.id, status = %next.status, "Listing submitted");
    Ok(Outcome::new(next, events))
}

pub fn approve_listing(
    listing: &Listing,
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    actor
        .can(MarketplaceAction::ApproveListing)
        .check(&config.roles)?;

    let mut next = listing.clone();
    next.status = ListingTransition::Approve.apply(listing.status)?;
    next.updated_at = now;

    info!(listing_id = %listing.id, approved_by = %actor.id, "Listing approved");

    let event = ListingEvent::ListingApproved {
        listing_id: listing.id,
        approved_by: actor.id,
    };
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Apply a content patch. Status never changes here.
pub fn update_listing(
    listing: &Listing,
    actor: &Actor,
    patch: ValidListingPatch,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    actor
        .can(MarketplaceAction::UpdateListing)
        .on(Resource::Listing {
            seller_id: listing.seller_id,
        })
        .check(&config.roles)?;

    if !is_editable(listing.status) {
        return Err(MarketplaceError::invalid_transition(
            EntityKind::Listing,
            listing.status,
            "update",
        ));
    }

    let mut next = listing.clone();
    if let Some(title) = patch.title {
        next.title = title;
    }
    if let Some(description) = patch.description {
        next.description = description;
    }
    if let Some(price) = patch.price {
        next.price = price;
    }
    if let Some(condition) = patch.condition {
        next.condition = condition;
    }
    if let Some(images) = patch.images {
        next.images = images;
    }
    if let Some(tags) = patch.tags {
        next.tags = tags;
    }
    next.updated_at = now;

    info!(listing_id = %listing.id, "Listing updated");

    let event = ListingEvent::ListingUpdated {
        listing: next.clone(),
    };
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Cancel by the seller or by a role allowed to delete listings.
pub fn cancel_listing(
    listing: &Listing,
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    actor
        .can(MarketplaceAction::CancelListing)
        .on(Resource::Listing {
            seller_id: listing.seller_id,
        })
        .check(&config.roles)?;

    let mut next = listing.clone();
    next.status = ListingTransition::Cancel.apply(listing.status)?;
    next.updated_at = now;

    info!(listing_id = %listing.id, cancelled_by = %actor.id, "Listing cancelled");

    let event = ListingEvent::ListingCancelled {
        listing_id: listing.id,
        cancelled_by: actor.id,
    };
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Reserve the listing for an accepted offer.
///
/// Only the offer engine calls this; the acceptance event carries the news.
pub fn mark_pending_payment(
    listing: &Listing,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Listing>> {
    let mut next = listing.clone();
    next.status = ListingTransition::MarkPendingPayment.apply(listing.status)?;
    next.updated_at = now;
    Ok(Outcome::silent(next))
}

/// Close the sale after a payment notification.
///
/// Never fails on status: a listing that is not PENDING_PAYMENT (a duplicate or
/// stray notification) is returned unchanged with no events.
pub fn mark_sold(listing: &Listing, now: DateTime<Utc>) -> Outcome<Listing> {
    match ListingTransition::MarkSold.apply(listing.status) {
        Ok(status) => {
            let mut next = listing.clone();
            next.status = status;
            next.updated_at = now;

            info!(listing_id = %listing.id, "Listing sold");

            let event = ListingEvent::ListingSold {
                listing_id: listing.id,
            };
            Outcome::new(next, vec![event.into()])
        }
        Err(err) => {
            warn!(
                listing_id = %listing.id,
                status = %listing.status,
                error = %err,
                "Ignoring payment notification"
            );
            Outcome::silent(listing.clone())
        }
    }
}

/// Expire an open listing once it has outlived `ttl`.
pub fn expire_listing(
    listing: &Listing,
    now: DateTime<Utc>,
    ttl: Duration,
) -> MarketplaceResult<Outcome<Listing>> {
    let status = ListingTransition::Expire.apply(listing.status)?;
    if listing.expires_at(ttl) > now {
        return Err(MarketplaceError::invalid_transition(
            EntityKind::Listing,
            listing.status,
            "expire (not yet due)",
        ));
    }

    let mut next = listing.clone();
    next.status = status;
    next.updated_at = now;

    info!(listing_id = %listing.id, "Listing expired");

    let event = ListingEvent::ListingExpired {
        listing_id: listing.id,
    };
    Ok(Outcome::new(next, vec![event.into()]))
}
