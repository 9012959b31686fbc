use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions a caller can request against the marketplace.
///
/// Each action maps to exactly one rule in [`super::builder::decide`]: either a
/// configured role set or an ownership check on the target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketplaceAction {
    /// Publish a new listing (role in `canCreateListings`)
    CreateListing,

    /// Move a draft into the approval queue (seller only)
    SubmitListing,

    /// Approve a pending listing (role in `canApproveListings`)
    ApproveListing,

    /// Edit listing content (seller only)
    UpdateListing,

    /// Cancel a listing (seller, or role in `canDeleteListings`)
    CancelListing,

    /// Place an offer (role in `canMakeOffers`)
    MakeOffer,

    /// Accept an offer (listing seller only)
    AcceptOffer,

    /// Reject an offer (listing seller only)
    RejectOffer,

    /// Change offer terms (offer buyer only)
    UpdateOffer,

    /// Withdraw an offer (offer buyer only)
    CancelOffer,

    /// Post a message on a listing (any authenticated caller)
    PostMessage,
}

impl fmt::Display for MarketplaceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketplaceAction::CreateListing => "create_listing",
            MarketplaceAction::SubmitListing => "submit_listing",
            MarketplaceAction::ApproveListing => "approve_listing",
            MarketplaceAction::UpdateListing => "update_listing",
            MarketplaceAction::CancelListing => "cancel_listing",
            MarketplaceAction::MakeOffer => "make_offer",
            MarketplaceAction::AcceptOffer => "accept_offer",
            MarketplaceAction::RejectOffer => "reject_offer",
            MarketplaceAction::UpdateOffer => "update_offer",
            MarketplaceAction::CancelOffer => "cancel_offer",
            MarketplaceAction::PostMessage => "post_message",
        };
        write!(f, "{}", name)
    }
}
