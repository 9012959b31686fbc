//! Listing events - FACT EVENTS ONLY
//!
//! Returned by the listing engine alongside the new snapshot. The host publishes
//! them after the snapshot is committed; failures go in `Result::Err`, never here.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::{ListingId, OfferId, UserId};
use crate::domains::listings::models::Listing;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ListingEvent {
    #[serde(rename = "marketplace.listing.created")]
    ListingCreated { listing: Listing },

    /// Draft handed to the approval queue
    #[serde(rename = "marketplace.listing.submitted")]
    ListingSubmitted {
        listing_id: ListingId,
        seller_id: UserId,
    },

    /// `approved_by` is the seller when auto-approval is on
    #[serde(rename = "marketplace.listing.approved")]
    ListingApproved {
        listing_id: ListingId,
        approved_by: UserId,
    },

    #[serde(rename = "marketplace.listing.updated")]
    ListingUpdated { listing: Listing },

    #[serde(rename = "marketplace.listing.deleted")]
    ListingCancelled {
        listing_id: ListingId,
        cancelled_by: UserId,
    },

    #[serde(rename = "marketplace.listing.pending_payment")]
    ListingPendingPayment {
        listing_id: ListingId,
        offer_id: OfferId,
        buyer_id: UserId,
        amount: Decimal,
    },

    #[serde(rename = "marketplace.listing.sold")]
    ListingSold { listing_id: ListingId },

    #[serde(rename = "marketplace.listing.expired")]
    ListingExpired { listing_id: ListingId },
}

impl ListingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ListingEvent::ListingCreated { .. } => "marketplace.listing.created",
            ListingEvent::ListingSubmitted { .. } => "marketplace.listing.submitted",
            ListingEvent::ListingApproved { .. } => "marketplace.listing.approved",
            ListingEvent::ListingUpdated { .. } => "marketplace.listing.updated",
            ListingEvent::ListingCancelled { .. } => "marketplace.listing.deleted",
            ListingEvent::ListingPendingPayment { .. } => "marketplace.listing.pending_payment",
            ListingEvent::ListingSold { .. } => "marketplace.listing.sold",
            ListingEvent::ListingExpired { .. } => "marketplace.listing.expired",
        }
    }
}
