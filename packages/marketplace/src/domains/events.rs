//! The single event list every engine operation returns.
//!
//! There is no process-wide dispatcher: the host decides how to deliver these
//! (see `kernel::publish_events`, which uses the event name as the subject).

use serde::Serialize;

use super::listings::events::ListingEvent;
use super::messages::events::MessageEvent;
use super::offers::events::OfferEvent;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarketplaceEvent {
    Listing(ListingEvent),
    Offer(OfferEvent),
    Message(MessageEvent),
}

impl MarketplaceEvent {
    /// Dotted event name, e.g. `marketplace.offer.accepted`
    pub fn name(&self) -> &'static str {
        match self {
            MarketplaceEvent::Listing(event) => event.name(),
            MarketplaceEvent::Offer(event) => event.name(),
            MarketplaceEvent::Message(event) => event.name(),
        }
    }
}

impl From<ListingEvent> for MarketplaceEvent {
    fn from(event: ListingEvent) -> Self {
        MarketplaceEvent::Listing(event)
    }
}

impl From<OfferEvent> for MarketplaceEvent {
    fn from(event: OfferEvent) -> Self {
        MarketplaceEvent::Offer(event)
    }
}

impl From<MessageEvent> for MarketplaceEvent {
    fn from(event: MessageEvent) -> Self {
        MarketplaceEvent::Message(event)
    }
}
