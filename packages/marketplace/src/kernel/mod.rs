//! Kernel module - host infrastructure and dependencies.
//!
//! Everything here is collaborator wiring around the pure domain engines:
//! storage, event publication, time, retries and background consumers.

pub mod deps;
pub mod memory_store;
pub mod nats;
pub mod payment_listener;
pub mod pg_store;
pub mod retry;
pub mod scheduled_tasks;
pub mod traits;

pub use deps::MarketplaceDeps;
pub use memory_store::InMemoryListingStore;
pub use nats::{publish_events, NatsClientPublisher, NatsPublisher, TestNats};
pub use payment_listener::{
    handle_payment_completed, run_payment_listener, PaymentCompleted, PAYMENT_COMPLETED_SUBJECT,
};
pub use pg_store::PgListingStore;
pub use retry::with_conflict_retry;
pub use scheduled_tasks::start_scheduler;
pub use traits::*;
