pub mod actions;
pub mod activities;
pub mod data;
pub mod events;
pub mod machines;
pub mod models;

pub use data::{ListingInput, ListingPatch};
pub use events::ListingEvent;
pub use models::{Condition, Listing, ListingStatus};
