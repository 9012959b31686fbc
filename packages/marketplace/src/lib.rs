// Marketplace Transactions - Core
//
// Listing and offer lifecycle engine for a peer-to-peer marketplace.
// Domain engines in domains/*/actions are pure: snapshot in, (state, events) out.
// Activities in domains/*/activities wire them to storage and NATS through kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
