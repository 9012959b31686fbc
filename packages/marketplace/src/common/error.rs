//! Structured failures returned by every marketplace operation.
//!
//! Nothing here is fatal: every variant is surfaced to the caller, and
//! [`MarketplaceError::kind`] / [`MarketplaceError::details`] let the host map
//! failures onto its transport uniformly.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::auth::AuthError;
use super::entity_ids::ListingId;
use super::validation::ValidationErrors;

pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Transport-agnostic error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    Forbidden,
    InvalidTransition,
    ListingUnavailable,
    SelfOffer,
    LimitExceeded,
    NotFound,
    Conflict,
    FeatureDisabled,
    Internal,
}

/// Which entity a failure is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Listing,
    Offer,
    Message,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Listing => write!(f, "listing"),
            EntityKind::Offer => write!(f, "offer"),
            EntityKind::Message => write!(f, "message"),
        }
    }
}

/// Configured count limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitKind {
    #[serde(rename = "maxListingsPerUser")]
    ListingsPerUser,
    #[serde(rename = "maxOffersPerListing")]
    OffersPerListing,
    #[serde(rename = "maxMessagesPerListing")]
    MessagesPerListing,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::ListingsPerUser => write!(f, "maxListingsPerUser"),
            LimitKind::OffersPerListing => write!(f, "maxOffersPerListing"),
            LimitKind::MessagesPerListing => write!(f, "maxMessagesPerListing"),
        }
    }
}

/// Feature flags that switch whole operation families off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Offers,
    Messaging,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Offers => write!(f, "offers"),
            Feature::Messaging => write!(f, "messaging"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Forbidden: {0}")]
    Forbidden(#[from] AuthError),

    #[error("Cannot {action} {entity} in status {from}")]
    InvalidTransition {
        entity: EntityKind,
        from: String,
        action: &'static str,
    },

    #[error("Listing {listing_id} is not accepting offers (status {status})")]
    ListingUnavailable { listing_id: ListingId, status: String },

    #[error("Sellers cannot make offers on their own listing {listing_id}")]
    SelfOffer { listing_id: ListingId },

    #[error("Limit {limit} reached ({current}/{max})")]
    LimitExceeded {
        limit: LimitKind,
        max: usize,
        current: usize,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Concurrent update detected on listing {listing_id}")]
    Conflict { listing_id: ListingId },

    #[error("Feature '{0}' is disabled")]
    FeatureDisabled(Feature),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn invalid_transition(
        entity: EntityKind,
        from: impl fmt::Display,
        action: &'static str,
    ) -> Self {
        MarketplaceError::InvalidTransition {
            entity,
            from: from.to_string(),
            action,
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<Uuid>) -> Self {
        MarketplaceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketplaceError::Validation(_) => ErrorKind::ValidationError,
            MarketplaceError::Forbidden(_) => ErrorKind::Forbidden,
            MarketplaceError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            MarketplaceError::ListingUnavailable { .. } => ErrorKind::ListingUnavailable,
            MarketplaceError::SelfOffer { .. } => ErrorKind::SelfOffer,
            MarketplaceError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            MarketplaceError::NotFound { .. } => ErrorKind::NotFound,
            MarketplaceError::Conflict { .. } => ErrorKind::Conflict,
            MarketplaceError::FeatureDisabled(_) => ErrorKind::FeatureDisabled,
            MarketplaceError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a host should reload its snapshot and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::Conflict { .. })
    }

    /// Structured payload for the caller. Internal errors expose no detail.
    pub fn details(&self) -> serde_json::Value {
        match self {
            MarketplaceError::Validation(errors) => json!({ "violations": errors.violations() }),
            MarketplaceError::Forbidden(auth) => json!({
                "action": auth.action(),
                "reason": auth.to_string(),
            }),
            MarketplaceError::InvalidTransition {
                entity,
                from,
                action,
            } => json!({ "entity": entity, "from": from, "action": action }),
            MarketplaceError::ListingUnavailable { listing_id, status } => {
                json!({ "listingId": listing_id, "status": status })
            }
            MarketplaceError::SelfOffer { listing_id } => json!({ "listingId": listing_id }),
            MarketplaceError::LimitExceeded {
                limit,
                max,
                current,
            } => json!({ "limit": limit, "max": max, "current": current }),
            MarketplaceError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
            MarketplaceError::Conflict { listing_id } => json!({ "listingId": listing_id }),
            MarketplaceError::FeatureDisabled(feature) => json!({ "feature": feature }),
            MarketplaceError::Internal(_) => json!({}),
        }
    }
}
