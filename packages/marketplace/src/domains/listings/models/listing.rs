use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::common::{ListingId, UserId};

/// Listing snapshot - a sellable item published by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    /// Fixed at creation
    pub seller_id: UserId,

    // Content
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub condition: Condition,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,

    pub status: ListingStatus,

    /// Aggregate revision (listing + offers + messages), bumped by storage on every commit
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// When an open listing stops being eligible to stay open.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.seller_id == user_id
    }
}

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "listing_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Draft,
    PendingApproval,
    Available,
    PendingPayment,
    Sold,
    Cancelled,
    Expired,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 7] = [
        ListingStatus::Draft,
        ListingStatus::PendingApproval,
        ListingStatus::Available,
        ListingStatus::PendingPayment,
        ListingStatus::Sold,
        ListingStatus::Cancelled,
        ListingStatus::Expired,
    ];

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ListingStatus::Sold | ListingStatus::Cancelled | ListingStatus::Expired
        )
    }

    /// Offers can only be placed on available listings
    pub fn accepts_offers(&self) -> bool {
        matches!(self, ListingStatus::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "DRAFT",
            ListingStatus::PendingApproval => "PENDING_APPROVAL",
            ListingStatus::Available => "AVAILABLE",
            ListingStatus::PendingPayment => "PENDING_PAYMENT",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Cancelled => "CANCELLED",
            ListingStatus::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ListingStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid listing status: {}", s))
    }
}

/// Item condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "listing_condition", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::New => write!(f, "NEW"),
            Condition::LikeNew => write!(f, "LIKE_NEW"),
            Condition::Good => write!(f, "GOOD"),
            Condition::Fair => write!(f, "FAIR"),
        }
    }
}

impl std::str::FromStr for Condition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(Condition::New),
            "LIKE_NEW" => Ok(Condition::LikeNew),
            "GOOD" => Ok(Condition::Good),
            "FAIR" => Ok(Condition::Fair),
            _ => Err(anyhow::anyhow!("Invalid condition: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "pending_payment".parse::<ListingStatus>().unwrap(),
            ListingStatus::PendingPayment
        );
        assert_eq!("SOLD".parse::<ListingStatus>().unwrap(), ListingStatus::Sold);
        assert!("ACTIVE".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn status_display_matches_serde() {
        for status in ListingStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn condition_accepts_lowercase() {
        assert_eq!("like_new".parse::<Condition>().unwrap(), Condition::LikeNew);
        assert!("broken".parse::<Condition>().is_err());
    }
}
