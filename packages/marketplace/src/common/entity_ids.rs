//! Typed ID definitions for marketplace entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for users (sellers, buyers, moderators).
pub struct User;

/// Marker type for Listing entities.
pub struct Listing;

/// Marker type for Offer entities.
pub struct Offer;

/// Marker type for ListingMessage entities.
pub struct ListingMessage;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for users. Identity comes from the host's authentication layer.
pub type UserId = Id<User>;

pub type ListingId = Id<Listing>;

pub type OfferId = Id<Offer>;

pub type MessageId = Id<ListingMessage>;
