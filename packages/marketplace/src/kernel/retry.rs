//! Bounded retry for optimistic commits.

use std::future::Future;
use tracing::debug;

use crate::common::MarketplaceResult;

/// Run `attempt` until it succeeds, fails with a non-retryable error, or has
/// been tried `1 + retries` times. Each attempt must reload its snapshot.
pub async fn with_conflict_retry<T, F, Fut>(
    operation: &'static str,
    retries: u32,
    mut attempt: F,
) -> MarketplaceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MarketplaceResult<T>>,
{
    let mut tries = 0;
    loop {
        match attempt().await {
            Err(err) if err.is_retryable() && tries < retries => {
                tries += 1;
                debug!(operation, attempt = tries, error = %err, "Retrying after conflict");
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ListingId, MarketplaceError};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn gives_up_after_bounded_retries() {
        let calls = AtomicU32::new(0);
        let listing_id = ListingId::new();

        let result: MarketplaceResult<()> = with_conflict_retry("test", 2, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(MarketplaceError::Conflict { listing_id }) }
        })
        .await;

        assert!(matches!(result, Err(MarketplaceError::Conflict { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: MarketplaceResult<()> = with_conflict_retry("test", 5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(MarketplaceError::Internal(anyhow::anyhow!("boom"))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_once_the_conflict_clears() {
        let calls = AtomicU32::new(0);
        let listing_id = ListingId::new();

        let result = with_conflict_retry("test", 3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(MarketplaceError::Conflict { listing_id })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
    }
}
