//! Listing state machine - the only place listing statuses are related.
//!
//! ```text
//! DRAFT ──submit──► PENDING_APPROVAL ──approve──► AVAILABLE ──reserve──► PENDING_PAYMENT ──mark sold──► SOLD
//!
//! DRAFT | PENDING_APPROVAL | AVAILABLE ──cancel──► CANCELLED
//! PENDING_APPROVAL | AVAILABLE ──expire──► EXPIRED
//! ```
//!
//! SOLD, CANCELLED and EXPIRED are terminal.

use crate::common::{EntityKind, MarketplaceError};
use crate::domains::listings::models::ListingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingTransition {
    Submit,
    Approve,
    MarkPendingPayment,
    MarkSold,
    Cancel,
    Expire,
}

impl ListingTransition {
    pub const ALL: [ListingTransition; 6] = [
        ListingTransition::Submit,
        ListingTransition::Approve,
        ListingTransition::MarkPendingPayment,
        ListingTransition::MarkSold,
        ListingTransition::Cancel,
        ListingTransition::Expire,
    ];

    pub fn target(self) -> ListingStatus {
        match self {
            ListingTransition::Submit => ListingStatus::PendingApproval,
            ListingTransition::Approve => ListingStatus::Available,
            ListingTransition::MarkPendingPayment => ListingStatus::PendingPayment,
            ListingTransition::MarkSold => ListingStatus::Sold,
            ListingTransition::Cancel => ListingStatus::Cancelled,
            ListingTransition::Expire => ListingStatus::Expired,
        }
    }

    pub fn allowed_from(self, from: ListingStatus) -> bool {
        use ListingStatus::*;

        match self {
            ListingTransition::Submit => from == Draft,
            ListingTransition::Approve => from == PendingApproval,
            ListingTransition::MarkPendingPayment => from == Available,
            ListingTransition::MarkSold => from == PendingPayment,
            ListingTransition::Cancel => matches!(from, Draft | PendingApproval | Available),
            ListingTransition::Expire => matches!(from, PendingApproval | Available),
        }
    }

    /// Verb used in error messages
    pub fn verb(self) -> &'static str {
        match self {
            ListingTransition::Submit => "submit",
            ListingTransition::Approve => "approve",
            ListingTransition::MarkPendingPayment => "reserve",
            ListingTransition::MarkSold => "mark sold",
            ListingTransition::Cancel => "cancel",
            ListingTransition::Expire => "expire",
        }
    }

    /// Target status, or `InvalidTransition` when `from` cannot make this move.
    pub fn apply(self, from: ListingStatus) -> Result<ListingStatus, MarketplaceError> {
        if self.allowed_from(from) {
            Ok(self.target())
        } else {
            Err(MarketplaceError::invalid_transition(
                EntityKind::Listing,
                from,
                self.verb(),
            ))
        }
    }
}

/// Whether any single transition moves `from` to `to`.
pub fn can_transition(from: ListingStatus, to: ListingStatus) -> bool {
    ListingTransition::ALL
        .into_iter()
        .any(|t| t.target() == to && t.allowed_from(from))
}

/// Content edits are allowed until the listing is reserved or closed.
pub fn is_editable(status: ListingStatus) -> bool {
    matches!(
        status,
        ListingStatus::Draft | ListingStatus::PendingApproval | ListingStatus::Available
    )
}
