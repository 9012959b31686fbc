/// Authorization policy for marketplace actions
///
/// Provides a fluent API over a pure decision function:
///
/// ```rust
/// use marketplace_core::common::auth::{Actor, MarketplaceAction, Resource};
/// use marketplace_core::common::UserId;
/// use marketplace_core::config::RolePolicy;
///
/// let seller = UserId::new();
/// let roles = RolePolicy::default();
///
/// Actor::new(seller, "user")
///     .can(MarketplaceAction::UpdateListing)
///     .on(Resource::Listing { seller_id: seller })
///     .check(&roles)
///     .unwrap();
/// ```
///
/// Who the caller is comes from the host; this module only decides whether that
/// caller may perform the requested action.

mod builder;
mod capability;
mod errors;

pub use builder::{decide, Actor, ActionBuilder, Resource};
pub use capability::MarketplaceAction;
pub use errors::AuthError;
