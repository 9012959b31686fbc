//! Field-tagged validation errors.
//!
//! Validators push every violation they find instead of stopping at the first
//! one, so a caller can report all problems with a payload at once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const MONEY_SCALE: u32 = 2;
const MONEY_LIMIT: i64 = 1_000_000_000_000;

/// A single violated constraint on one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violated constraint found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn require_non_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    /// Checks a price or amount against the `NUMERIC(14, 2)` columns it is
    /// stored in: non-negative, at most cents, below a trillion.
    pub fn require_money(&mut self, field: &str, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.push(field, "must be greater than or equal to 0");
            return;
        }
        if value.normalize().scale() > MONEY_SCALE {
            self.push(field, format!("must have at most {} decimal places", MONEY_SCALE));
        }
        if value >= Decimal::from(MONEY_LIMIT) {
            self.push(field, format!("must be less than {}", MONEY_LIMIT));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(value)` when nothing was pushed, otherwise every collected violation.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
