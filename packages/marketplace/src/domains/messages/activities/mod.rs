//! Message activities.

use tracing::info;

use crate::common::auth::Actor;
use crate::common::{ListingId, MarketplaceError, MarketplaceResult, Outcome};
use crate::domains::messages::actions as message_actions;
use crate::domains::messages::data::MessageInput;
use crate::domains::messages::models::ListingMessage;
use crate::kernel::{with_conflict_retry, Changeset, MarketplaceDeps};

/// Post a message on a listing.
///
/// The commit is guarded by the listing version so two posts cannot both take
/// the last free slot under `maxMessagesPerListing`.
pub async fn post_message(
    listing_id: ListingId,
    input: MessageInput,
    actor: &Actor,
    deps: &MarketplaceDeps,
) -> MarketplaceResult<Outcome<ListingMessage>> {
    info!(listing_id = %listing_id, sender_id = %actor.id, "Posting message");

    let valid = input.validate()?;
    let valid = &valid;

    let outcome = with_conflict_retry("post_message", deps.commit_retries(), move || async move {
        let listing = deps.listing(listing_id).await?;
        let count = deps.store.count_messages(listing_id).await?;

        let outcome = message_actions::post_message(
            &listing,
            actor,
            valid.clone(),
            count,
            &deps.config,
            deps.now(),
        )?;

        deps.commit(Changeset::for_listing(&listing).with_message(outcome.state.clone()))
            .await?;
        Ok::<_, MarketplaceError>(outcome)
    })
    .await?;

    deps.publish(&outcome.events).await;
    Ok(outcome)
}
