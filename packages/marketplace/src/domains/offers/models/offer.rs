use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{ListingId, OfferId, UserId};

/// Offer snapshot - a buyer's proposed terms against one listing
///
/// Correlated with its listing by `listing_id`; the listing does not own it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    /// Set when status is REJECTED
    pub rejection_reason: Option<RejectionReason>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Counts toward `maxOffersPerListing` and blocks nothing else
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "offer_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    /// Reserved for counter-offers; no operation moves an offer here.
    Countered,
    Cancelled,
}

impl OfferStatus {
    pub const ALL: [OfferStatus; 5] = [
        OfferStatus::Pending,
        OfferStatus::Accepted,
        OfferStatus::Rejected,
        OfferStatus::Countered,
        OfferStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OfferStatus::Accepted | OfferStatus::Rejected | OfferStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "PENDING",
            OfferStatus::Accepted => "ACCEPTED",
            OfferStatus::Rejected => "REJECTED",
            OfferStatus::Countered => "COUNTERED",
            OfferStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        OfferStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid offer status: {}", s))
    }
}

/// Why an offer ended up REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "offer_rejection_reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The seller turned it down
    Seller,
    /// Another offer on the same listing was accepted
    Superseded,
    /// The listing was cancelled or expired
    ListingClosed,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Seller => "SELLER",
            RejectionReason::Superseded => "SUPERSEDED",
            RejectionReason::ListingClosed => "LISTING_CLOSED",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RejectionReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELLER" => Ok(RejectionReason::Seller),
            "SUPERSEDED" => Ok(RejectionReason::Superseded),
            "LISTING_CLOSED" => Ok(RejectionReason::ListingClosed),
            _ => Err(anyhow::anyhow!("Invalid rejection reason: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countered_is_not_terminal() {
        assert!(!OfferStatus::Countered.is_terminal());
        assert!(!OfferStatus::Pending.is_terminal());
        assert!(OfferStatus::Accepted.is_terminal());
        assert!(OfferStatus::Rejected.is_terminal());
        assert!(OfferStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_roundtrips_through_text() {
        for status in OfferStatus::ALL {
            assert_eq!(status.to_string().parse::<OfferStatus>().unwrap(), status);
        }
    }
}
