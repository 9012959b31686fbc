//! Offer events - FACT EVENTS ONLY

use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::{ListingId, OfferId, UserId};
use crate::domains::offers::models::{Offer, RejectionReason};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum OfferEvent {
    #[serde(rename = "marketplace.offer.created")]
    OfferCreated { offer: Offer },

    #[serde(rename = "marketplace.offer.accepted")]
    OfferAccepted {
        offer_id: OfferId,
        listing_id: ListingId,
        buyer_id: UserId,
        amount: Decimal,
    },

    /// Emitted for seller rejections and for offers closed by another transition
    #[serde(rename = "marketplace.offer.rejected")]
    OfferRejected {
        offer_id: OfferId,
        listing_id: ListingId,
        buyer_id: UserId,
        reason: RejectionReason,
    },

    #[serde(rename = "marketplace.offer.updated")]
    OfferUpdated { offer: Offer },

    #[serde(rename = "marketplace.offer.cancelled")]
    OfferCancelled {
        offer_id: OfferId,
        listing_id: ListingId,
    },
}

impl OfferEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OfferEvent::OfferCreated { .. } => "marketplace.offer.created",
            OfferEvent::OfferAccepted { .. } => "marketplace.offer.accepted",
            OfferEvent::OfferRejected { .. } => "marketplace.offer.rejected",
            OfferEvent::OfferUpdated { .. } => "marketplace.offer.updated",
            OfferEvent::OfferCancelled { .. } => "marketplace.offer.cancelled",
        }
    }

    pub(crate) fn rejected(offer: &Offer, reason: RejectionReason) -> Self {
        OfferEvent::OfferRejected {
            offer_id: offer.id,
            listing_id: offer.listing_id,
            buyer_id: offer.buyer_id,
            reason,
        }
    }
}
