use serde::{Deserialize, Serialize};

use super::{AuthError, MarketplaceAction};
use crate::common::entity_ids::UserId;
use crate::config::RolePolicy;

/// An authenticated caller: identity and role come from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: String,
}

/// The resource an action targets, reduced to the ownership facts the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// No specific resource (creating a listing)
    Marketplace,
    Listing {
        seller_id: UserId,
    },
    Offer {
        buyer_id: UserId,
        seller_id: UserId,
    },
}

impl Actor {
    pub fn new(id: UserId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }

    /// Specify what the actor wants to do
    pub fn can(&self, action: MarketplaceAction) -> ActionBuilder<'_> {
        ActionBuilder {
            actor: self,
            action,
            resource: Resource::Marketplace,
        }
    }
}

/// Builder after specifying the action
pub struct ActionBuilder<'a> {
    actor: &'a Actor,
    action: MarketplaceAction,
    resource: Resource,
}

impl ActionBuilder<'_> {
    /// Specify the resource the action targets
    pub fn on(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    /// Perform the authorization check
    pub fn check(self, roles: &RolePolicy) -> Result<(), AuthError> {
        decide(self.actor, self.action, &self.resource, roles)
    }
}

/// Core permission decision.
///
/// Pure function of (actor, action, resource, configured role sets).
pub fn decide(
    actor: &Actor,
    action: MarketplaceAction,
    resource: &Resource,
    roles: &RolePolicy,
) -> Result<(), AuthError> {
    let role_allowed = |set: &std::collections::BTreeSet<String>| set.contains(&actor.role);
    let role_denied = || AuthError::RoleNotPermitted {
        action,
        role: actor.role.clone(),
    };

    match action {
        MarketplaceAction::CreateListing => {
            if role_allowed(&roles.can_create_listings) {
                Ok(())
            } else {
                Err(role_denied())
            }
        }
        MarketplaceAction::ApproveListing => {
            if role_allowed(&roles.can_approve_listings) {
                Ok(())
            } else {
                Err(role_denied())
            }
        }
        MarketplaceAction::MakeOffer => {
            if role_allowed(&roles.can_make_offers) {
                Ok(())
            } else {
                Err(role_denied())
            }
        }
        MarketplaceAction::SubmitListing | MarketplaceAction::UpdateListing => {
            require_owner(actor, action, listing_seller(resource), "seller")
        }
        MarketplaceAction::CancelListing => {
            if role_allowed(&roles.can_delete_listings) {
                return Ok(());
            }
            require_owner(actor, action, listing_seller(resource), "seller")
        }
        MarketplaceAction::AcceptOffer | MarketplaceAction::RejectOffer => {
            require_owner(actor, action, listing_seller(resource), "seller")
        }
        MarketplaceAction::UpdateOffer | MarketplaceAction::CancelOffer => {
            let buyer = match resource {
                Resource::Offer { buyer_id, .. } => Some(*buyer_id),
                _ => None,
            };
            require_owner(actor, action, buyer, "buyer")
        }
        MarketplaceAction::PostMessage => Ok(()),
    }
}

fn listing_seller(resource: &Resource) -> Option<UserId> {
    match resource {
        Resource::Listing { seller_id } | Resource::Offer { seller_id, .. } => Some(*seller_id),
        Resource::Marketplace => None,
    }
}

fn require_owner(
    actor: &Actor,
    action: MarketplaceAction,
    owner: Option<UserId>,
    owner_label: &'static str,
) -> Result<(), AuthError> {
    match owner {
        Some(owner_id) if owner_id == actor.id => Ok(()),
        _ => Err(AuthError::NotOwner {
            action,
            owner: owner_label,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> RolePolicy {
        RolePolicy::default()
    }

    #[test]
    fn test_moderator_can_approve() {
        let moderator = Actor::new(UserId::new(), "moderator");
        let result = moderator
            .can(MarketplaceAction::ApproveListing)
            .check(&roles());
        assert!(result.is_ok());
    }

    #[test]
    fn test_plain_user_cannot_approve() {
        let user = Actor::new(UserId::new(), "user");
        let result = user.can(MarketplaceAction::ApproveListing).check(&roles());
        assert!(matches!(result, Err(AuthError::RoleNotPermitted { .. })));
    }

    #[test]
    fn test_only_seller_updates_listing() {
        let seller = UserId::new();
        let listing = Resource::Listing { seller_id: seller };

        assert!(Actor::new(seller, "user")
            .can(MarketplaceAction::UpdateListing)
            .on(listing)
            .check(&roles())
            .is_ok());

        let stranger = Actor::new(UserId::new(), "admin");
        let result = stranger
            .can(MarketplaceAction::UpdateListing)
            .on(listing)
            .check(&roles());
        assert_eq!(
            result,
            Err(AuthError::NotOwner {
                action: MarketplaceAction::UpdateListing,
                owner: "seller"
            })
        );
    }

    #[test]
    fn test_delete_role_cancels_foreign_listing() {
        let listing = Resource::Listing {
            seller_id: UserId::new(),
        };
        let admin = Actor::new(UserId::new(), "admin");
        assert!(admin
            .can(MarketplaceAction::CancelListing)
            .on(listing)
            .check(&roles())
            .is_ok());

        let user = Actor::new(UserId::new(), "user");
        assert!(user
            .can(MarketplaceAction::CancelListing)
            .on(listing)
            .check(&roles())
            .is_err());
    }

    #[test]
    fn test_offer_terms_belong_to_buyer() {
        let buyer = UserId::new();
        let seller = UserId::new();
        let offer = Resource::Offer {
            buyer_id: buyer,
            seller_id: seller,
        };

        assert!(Actor::new(buyer, "user")
            .can(MarketplaceAction::UpdateOffer)
            .on(offer)
            .check(&roles())
            .is_ok());
        assert!(Actor::new(seller, "user")
            .can(MarketplaceAction::UpdateOffer)
            .on(offer)
            .check(&roles())
            .is_err());
        assert!(Actor::new(seller, "user")
            .can(MarketplaceAction::AcceptOffer)
            .on(offer)
            .check(&roles())
            .is_ok());
    }

    #[test]
    fn test_ownership_action_without_resource_is_denied() {
        let actor = Actor::new(UserId::new(), "admin");
        assert!(actor
            .can(MarketplaceAction::AcceptOffer)
            .check(&roles())
            .is_err());
    }
}
