//! Message events - FACT EVENTS ONLY

use serde::Serialize;

use crate::domains::messages::models::ListingMessage;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MessageEvent {
    #[serde(rename = "marketplace.message.created")]
    MessageCreated { message: ListingMessage },
}

impl MessageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MessageEvent::MessageCreated { .. } => "marketplace.message.created",
        }
    }
}
