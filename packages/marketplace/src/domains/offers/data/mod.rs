//! Offer payloads and their validated forms.

use rust_decimal::Decimal;
use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::common::ValidationErrors;

/// Raw create-offer payload
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub amount: Decimal,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidOffer {
    pub amount: Decimal,
    pub message: Option<String>,
}

impl OfferInput {
    pub fn validate(&self) -> Result<ValidOffer, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_money("amount", self.amount);

        errors.into_result(ValidOffer {
            amount: self.amount,
            message: normalize_message(self.message.as_deref()),
        })
    }
}

/// Raw update-offer payload (buyer-side terms only)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    pub amount: Option<Decimal>,
    pub message: Option<String>,
    /// Seller-only field; never accepted here
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidOfferPatch {
    pub amount: Option<Decimal>,
    pub message: Option<String>,
}

impl OfferPatch {
    pub fn validate(&self) -> Result<ValidOfferPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.status.is_some() {
            errors.push("status", "cannot be changed by the buyer");
        }
        if let Some(amount) = self.amount {
            errors.require_money("amount", amount);
        }

        errors.into_result(ValidOfferPatch {
            amount: self.amount,
            message: normalize_message(self.message.as_deref()),
        })
    }
}

/// Blank messages are treated as absent
fn normalize_message(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_rejected() {
        let input = OfferInput::builder().amount(Decimal::new(-1, 2)).build();
        let errors = input.validate().unwrap_err();
        assert!(errors.has_field("amount"));
    }

    #[test]
    fn sub_cent_amount_is_rejected() {
        let input = OfferInput::builder().amount(Decimal::new(5, 3)).build();
        let errors = input.validate().unwrap_err();
        assert!(errors.has_field("amount"));

        let patch = OfferPatch {
            amount: Some(Decimal::new(10_001, 3)),
            ..OfferPatch::default()
        };
        assert!(patch.validate().unwrap_err().has_field("amount"));
    }

    #[test]
    fn zero_amount_and_blank_message_are_fine() {
        let input = OfferInput::builder()
            .amount(Decimal::ZERO)
            .message("   ")
            .build();
        let valid = input.validate().unwrap();
        assert_eq!(valid.amount, Decimal::ZERO);
        assert_eq!(valid.message, None);
    }

    #[test]
    fn patch_cannot_carry_status() {
        let patch = OfferPatch {
            status: Some("ACCEPTED".to_string()),
            amount: Some(Decimal::new(-5, 0)),
            ..OfferPatch::default()
        };
        let errors = patch.validate().unwrap_err();
        assert!(errors.has_field("status"));
        assert!(errors.has_field("amount"));
    }
}
