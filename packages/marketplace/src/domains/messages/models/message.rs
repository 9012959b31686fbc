use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ListingId, MessageId, UserId};

/// A message posted on a listing. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListingMessage {
    pub id: MessageId,
    pub listing_id: ListingId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
