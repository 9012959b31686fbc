//! Messaging guard: no state machine, only the feature gate and the volume limit.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::common::auth::{Actor, MarketplaceAction, Resource};
use crate::common::{Feature, LimitKind, MarketplaceError, MarketplaceResult, MessageId, Outcome};
use crate::config::MarketplaceConfig;
use crate::domains::listings::models::Listing;
use crate::domains::messages::data::ValidMessage;
use crate::domains::messages::events::MessageEvent;
use crate::domains::messages::models::ListingMessage;

/// Post a message on `listing`.
///
/// `message_count` is the number of messages already stored for the listing.
pub fn post_message(
    listing: &Listing,
    actor: &Actor,
    input: ValidMessage,
    message_count: usize,
    config: &MarketplaceConfig,
    now: DateTime<Utc>,
) -> MarketplaceResult<Outcome<ListingMessage>> {
    config.features.require(Feature::Messaging)?;

    actor
        .can(MarketplaceAction::PostMessage)
        .on(Resource::Listing {
            seller_id: listing.seller_id,
        })
        .check(&config.roles)?;

    let max = config.limits.max_messages_per_listing;
    if message_count >= max {
        return Err(MarketplaceError::LimitExceeded {
            limit: LimitKind::MessagesPerListing,
            max,
            current: message_count,
        });
    }

    let message = ListingMessage {
        id: MessageId::new(),
        listing_id: listing.id,
        sender_id: actor.id,
        content: input.content,
        created_at: now,
    };

    info!(message_id = %message.id, listing_id = %listing.id, sender_id = %actor.id, "Message posted");

    let event = MessageEvent::MessageCreated {
        message: message.clone(),
    };
    Ok(Outcome::new(message, vec![event.into()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorKind, ListingId, UserId};
    use crate::domains::listings::models::{Condition, ListingStatus};
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;

    fn listing() -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(),
            seller_id: UserId::new(),
            title: "Sofa".to_string(),
            description: "Three seater".to_string(),
            price: Decimal::new(200, 0),
            condition: Condition::Fair,
            images: vec!["https://img.example.com/sofa.jpg".to_string()],
            tags: BTreeSet::new(),
            status: ListingStatus::Available,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn hello() -> ValidMessage {
        ValidMessage {
            content: "Hello".to_string(),
        }
    }

    #[test]
    fn any_authenticated_user_can_post() {
        let listing = listing();
        let guest = Actor::new(UserId::new(), "guest");

        let outcome = post_message(
            &listing,
            &guest,
            hello(),
            0,
            &MarketplaceConfig::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(outcome.state.sender_id, guest.id);
        assert_eq!(outcome.state.listing_id, listing.id);
        assert_eq!(outcome.events[0].name(), "marketplace.message.created");
    }

    #[test]
    fn message_limit_is_enforced() {
        let config = MarketplaceConfig::default();
        let max = config.limits.max_messages_per_listing;
        let actor = Actor::new(UserId::new(), "user");

        let err = post_message(&listing(), &actor, hello(), max, &config, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            MarketplaceError::LimitExceeded {
                limit: LimitKind::MessagesPerListing,
                ..
            }
        ));
    }

    #[test]
    fn messaging_can_be_switched_off() {
        let mut config = MarketplaceConfig::default();
        config.features.messaging = false;
        let actor = Actor::new(UserId::new(), "user");

        let err = post_message(&listing(), &actor, hello(), 0, &config, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FeatureDisabled);
    }
}
