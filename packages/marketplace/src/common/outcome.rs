//! What an engine operation hands back to its host.

use serde::Serialize;

use super::error::{ErrorKind, MarketplaceError};
use crate::domains::events::MarketplaceEvent;

/// New state plus the facts to publish once that state is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub state: T,
    pub events: Vec<MarketplaceEvent>,
}

impl<T> Outcome<T> {
    pub fn new(state: T, events: Vec<MarketplaceEvent>) -> Self {
        Self { state, events }
    }

    /// A state change that produces no event (internal transitions).
    pub fn silent(state: T) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }
}

/// Wire shape of an operation result:
/// `{ok: true, state, events}` or `{ok: false, errorKind, details}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OperationResponse<T> {
    Success(Success<T>),
    Failure(Failure),
}

#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub ok: bool,
    pub state: T,
    pub events: Vec<MarketplaceEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub ok: bool,
    pub error_kind: ErrorKind,
    pub message: String,
    pub details: serde_json::Value,
}

impl<T> From<Result<Outcome<T>, MarketplaceError>> for OperationResponse<T> {
    fn from(result: Result<Outcome<T>, MarketplaceError>) -> Self {
        match result {
            Ok(outcome) => OperationResponse::Success(Success {
                ok: true,
                state: outcome.state,
                events: outcome.events,
            }),
            Err(err) => OperationResponse::Failure(Failure {
                ok: false,
                error_kind: err.kind(),
                message: err.to_string(),
                details: err.details(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Feature;
    use serde_json::json;

    #[test]
    fn failure_serializes_with_error_kind() {
        let result: Result<Outcome<()>, MarketplaceError> =
            Err(MarketplaceError::FeatureDisabled(Feature::Messaging));
        let response = OperationResponse::from(result);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["errorKind"], json!("FeatureDisabled"));
        assert_eq!(value["details"], json!({ "feature": "messaging" }));
    }

    #[test]
    fn success_serializes_state_and_events() {
        let result: Result<Outcome<i32>, MarketplaceError> = Ok(Outcome::silent(42));
        let response = OperationResponse::from(result);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "ok": true, "state": 42, "events": [] }));
    }
}
