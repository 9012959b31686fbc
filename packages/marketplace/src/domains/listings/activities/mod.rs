//! Listings domain activities - entry-point business logic
//!
//! Activities are self-contained: they take raw input, run the engine against
//! a fresh snapshot, commit, and publish the resulting events.

pub mod core;
pub mod lifecycle;

pub use self::core::{approve_listing, cancel_listing, create_listing, submit_listing, update_listing};
pub use self::lifecycle::{complete_payment, expire_due_listings, expire_listing};
