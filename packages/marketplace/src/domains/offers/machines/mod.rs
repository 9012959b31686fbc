//! Offer state machine.
//!
//! Every move starts from PENDING; ACCEPTED, REJECTED and CANCELLED are terminal.
//! COUNTERED has no incoming or outgoing transition.

use crate::common::{EntityKind, MarketplaceError};
use crate::domains::offers::models::OfferStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferTransition {
    Accept,
    Reject,
    UpdateTerms,
    Cancel,
}

impl OfferTransition {
    pub fn target(self) -> OfferStatus {
        match self {
            OfferTransition::Accept => OfferStatus::Accepted,
            OfferTransition::Reject => OfferStatus::Rejected,
            OfferTransition::UpdateTerms => OfferStatus::Pending,
            OfferTransition::Cancel => OfferStatus::Cancelled,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            OfferTransition::Accept => "accept",
            OfferTransition::Reject => "reject",
            OfferTransition::UpdateTerms => "update",
            OfferTransition::Cancel => "cancel",
        }
    }

    pub fn apply(self, from: OfferStatus) -> Result<OfferStatus, MarketplaceError> {
        if from == OfferStatus::Pending {
            Ok(self.target())
        } else {
            Err(MarketplaceError::invalid_transition(
                EntityKind::Offer,
                from,
                self.verb(),
            ))
        }
    }
}
