//! Listing messages: no lifecycle, only a feature gate and a volume limit.

pub mod actions;
pub mod activities;
pub mod data;
pub mod events;
pub mod models;

pub use data::MessageInput;
pub use events::MessageEvent;
pub use models::ListingMessage;
