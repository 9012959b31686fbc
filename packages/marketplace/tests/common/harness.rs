//! Test harness for integration testing.
//!
//! Every test gets its own in-memory store, NATS spy and pinned clock, wired
//! into the same `MarketplaceDeps` the worker uses in production.

use chrono::{TimeZone, Utc};
use marketplace_core::kernel::{FixedClock, InMemoryListingStore, MarketplaceDeps, TestNats};
use marketplace_core::MarketplaceConfig;
use std::sync::Arc;
use test_context::AsyncTestContext;

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let listing = create_listing(input, &seller, &ctx.deps).await.unwrap();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub store: Arc<InMemoryListingStore>,
    /// Everything the activities published
    pub nats: Arc<TestNats>,
    pub clock: Arc<FixedClock>,
    pub deps: MarketplaceDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // In-memory state is dropped with the harness
    }
}

impl TestHarness {
    /// Harness with default marketplace rules
    pub fn new() -> Self {
        Self::with_config(MarketplaceConfig::default())
    }

    pub fn with_config(config: MarketplaceConfig) -> Self {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(InMemoryListingStore::new());
        let nats = Arc::new(TestNats::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let deps = MarketplaceDeps::new(store.clone(), nats.clone(), clock.clone(), config);

        Self {
            store,
            nats,
            clock,
            deps,
        }
    }
}
