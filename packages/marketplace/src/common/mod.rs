// Common types and utilities shared across the marketplace domains

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod outcome;
pub mod validation;

pub use auth::{Actor, AuthError, MarketplaceAction, Resource};
pub use entity_ids::{ListingId, MessageId, OfferId, UserId};
pub use error::{EntityKind, ErrorKind, Feature, LimitKind, MarketplaceError, MarketplaceResult};
pub use id::Id;
pub use outcome::{OperationResponse, Outcome};
pub use validation::{FieldViolation, ValidationErrors};
