pub mod events;
pub mod listings;
pub mod messages;
pub mod offers;

pub use events::MarketplaceEvent;
