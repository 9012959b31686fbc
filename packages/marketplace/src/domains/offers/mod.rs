pub mod actions;
pub mod activities;
pub mod data;
pub mod events;
pub mod machines;
pub mod models;

pub use actions::Acceptance;
pub use data::{OfferInput, OfferPatch};
pub use events::OfferEvent;
pub use models::{Offer, OfferStatus, RejectionReason};
