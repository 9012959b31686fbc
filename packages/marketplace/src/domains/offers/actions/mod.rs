//! Offer lifecycle engine.
//!
//! Acceptance is the one cross-entity operation: the accepted offer, the
//! listing reservation and every superseded sibling are decided together and
//! returned as a single [`Acceptance`] for the host to commit atomically.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::common::auth::{Actor, MarketplaceAction, Resource};
use crate::common::{
    EntityKind, Feature, LimitKind, MarketplaceError, MarketplaceResult, OfferId, Outcome,
};
use crate::config::MarketplaceConfig;
use crate::domains::events::MarketplaceEvent;
use crate::domains::listings::actions::mark_pending_payment;
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::models::Listing;
use crate::domains::offers::data::{ValidOffer, ValidOfferPatch};
use crate::domains::offers::events::OfferEvent;
use crate::domains::offers::machines::OfferTransition;
use crate::domains::offers::models::{Offer, OfferStatus, RejectionReason};

/// Everything an accepted offer changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Acceptance {
    pub listing: Listing,
    pub accepted: Offer,
    /// Other offers on the listing that were still PENDING, now REJECTED
    pub superseded: Vec<Offer>,
}

fn offer_resource(offer: &Offer, listing: &Listing) -> Resource {
    Resource::Offer {
        buyer_id: offer.buyer_id,
        seller_id: listing.seller_id,
    }
}

fn ensure_offer_on_listing(offer: &Offer, listing: &Listing) -> MarketplaceResult<()> {
    if offer.listing_id != listing.id {
        return Err(MarketplaceError::not_found(EntityKind::Offer, offer.id));
    }
    Ok(())
}

fn ensure_accepting_offers(listing: &Listing) -> MarketplaceResult<()> {
    if !listing.status.accepts_offers() {
        return Err(MarketplaceError::ListingUnavailable {
            listing_id: listing.id,
            status: listing.status.to_string(),
        });
    }
    Ok(())
}

fn rejected(offer: &Offer, reason: RejectionReason, now: DateTime<Utc>) -> Offer {
    let mut next = offer.clone();
    next.status = OfferStatus::Rejected;
    next.rejection_reason = Some(reason);
    next.updated_at = now;
    next
}

/// Place an offer on an AVAILABLE listing.
///
/// `open_offers` is the number of non-terminal offers the listing already has.
pub fn create_offer(
    listing: &Listing,
    actor: &Actor,
    input: ValidOffer,
    open_offers: usize,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Offer>> {
    config.features.require(Feature::Offers)?;

    if listing.is_owned_by(actor.id) {
        return Err(MarketplaceError::SelfOffer {
            listing_id: listing.id,
        });
    }

    actor.can(MarketplaceAction::MakeOffer).check(&config.roles)?;
    ensure_accepting_offers(listing)?;

    let max = config.limits.max_offers_per_listing;
    if open_offers >= max {
        return Err(MarketplaceError::LimitExceeded {
            limit: LimitKind::OffersPerListing,
            max,
            current: open_offers,
        });
    }

    let offer = Offer {
        id: OfferId::new(),
        listing_id: listing.id,
        buyer_id: actor.id,
        amount: input.amount,
        message: input.message,
        status: OfferStatus::Pending,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };

    info!(
        offer_id = %offer.id,
        listing_id = %listing.id,
        buyer_id = %actor.id,
        amount = %offer.amount,
        "Offer created"
    );

    let event = OfferEvent::OfferCreated {
        offer: offer.clone(),
    };
    Ok(Outcome::new(offer, vec![event.into()]))
}

/// Accept `offer`, reserve the listing and reject every other pending offer.
///
/// `siblings` is the full offer set of the listing as loaded with the snapshot;
/// it may include `offer` itself.
pub fn accept_offer(
    offer: &Offer,
    listing: &Listing,
    siblings: &[Offer],
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Acceptance>> {
    config.features.require(Feature::Offers)?;
    ensure_offer_on_listing(offer, listing)?;

    actor
        .can(MarketplaceAction::AcceptOffer)
        .on(offer_resource(offer, listing))
        .check(&config.roles)?;

    let mut accepted = offer.clone();
    accepted.status = OfferTransition::Accept.apply(offer.status)?;
    accepted.updated_at = now;

    let reserved = mark_pending_payment(listing, now)?;

    let superseded: Vec<Offer> = siblings
        .iter()
        .filter(|o| o.id != offer.id && o.status == OfferStatus::Pending)
        .map(|o| rejected(o, RejectionReason::Superseded, now))
        .collect();

    let mut events: Vec<MarketplaceEvent> = vec![
        OfferEvent::OfferAccepted {
            offer_id: accepted.id,
            listing_id: listing.id,
            buyer_id: accepted.buyer_id,
            amount: accepted.amount,
        }
        .into(),
        ListingEvent::ListingPendingPayment {
            listing_id: listing.id,
            offer_id: accepted.id,
            buyer_id: accepted.buyer_id,
            amount: accepted.amount,
        }
        .into(),
    ];
    events.extend(
        superseded
            .iter()
            .map(|o| OfferEvent::rejected(o, RejectionReason::Superseded).into()),
    );
    events.extend(reserved.events);

    info!(
        offer_id = %accepted.id,
        listing_id = %listing.id,
        superseded = superseded.len(),
        "Offer accepted"
    );

    Ok(Outcome::new(
        Acceptance {
            listing: reserved.state,
            accepted,
            superseded,
        },
        events,
    ))
}

pub fn reject_offer(
    offer: &Offer,
    listing: &Listing,
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Offer>> {
    config.features.require(Feature::Offers)?;
    ensure_offer_on_listing(offer, listing)?;

    actor
        .can(MarketplaceAction::RejectOffer)
        .on(offer_resource(offer, listing))
        .check(&config.roles)?;

    OfferTransition::Reject.apply(offer.status)?;
    let next = rejected(offer, RejectionReason::Seller, now);

    info!(offer_id = %offer.id, listing_id = %listing.id, "Offer rejected");

    let event = OfferEvent::rejected(&next, RejectionReason::Seller);
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Buyer revises amount or message on a still-pending offer.
pub fn update_offer(
    offer: &Offer,
    listing: &Listing,
    actor: &Actor,
    patch: ValidOfferPatch,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Offer>> {
    config.features.require(Feature::Offers)?;
    ensure_offer_on_listing(offer, listing)?;

    actor
        .can(MarketplaceAction::UpdateOffer)
        .on(offer_resource(offer, listing))
        .check(&config.roles)?;

    let mut next = offer.clone();
    next.status = OfferTransition::UpdateTerms.apply(offer.status)?;
    ensure_accepting_offers(listing)?;

    if let Some(amount) = patch.amount {
        next.amount = amount;
    }
    if patch.message.is_some() {
        next.message = patch.message;
    }
    next.updated_at = now;

    info!(offer_id = %offer.id, amount = %next.amount, "Offer updated");

    let event = OfferEvent::OfferUpdated {
        offer: next.clone(),
    };
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Buyer withdraws a pending offer.
pub fn cancel_offer(
    offer: &Offer,
    listing: &Listing,
    actor: &Actor,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<Offer>> {
    config.features.require(Feature::Offers)?;
    ensure_offer_on_listing(offer, listing)?;

    actor
        .can(MarketplaceAction::CancelOffer)
        .on(offer_resource(offer, listing))
        .check(&config.roles)?;

    let mut next = offer.clone();
    next.status = OfferTransition::Cancel.apply(offer.status)?;
    next.updated_at = now;

    info!(offer_id = %offer.id, listing_id = %offer.listing_id, "Offer cancelled");

    let event = OfferEvent::OfferCancelled {
        offer_id: offer.id,
        listing_id: offer.listing_id,
    };
    Ok(Outcome::new(next, vec![event.into()]))
}

/// Reject every PENDING offer in `offers` with `reason`.
///
/// Used when a listing closes without a sale. Only the offers that changed are returned.
pub fn close_pending_offers(
    offers: &[Offer],
    reason: RejectionReason,
    now: DateTime<Utc>,
) -> Outcome<Vec<Offer>> {
    let closed: Vec<Offer> = offers
        .iter()
        .filter(|o| o.status == OfferStatus::Pending)
        .map(|o| rejected(o, reason, now))
        .collect();

    let events = closed
        .iter()
        .map(|o| OfferEvent::rejected(o, reason).into())
        .collect();

    Outcome::new(closed, events)
}
