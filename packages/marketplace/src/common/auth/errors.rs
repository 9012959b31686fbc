use thiserror::Error;

use super::MarketplaceAction;

/// Authorization failures for marketplace actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Role '{role}' may not {action}")]
    RoleNotPermitted {
        action: MarketplaceAction,
        role: String,
    },

    #[error("Only the {owner} may {action}")]
    NotOwner {
        action: MarketplaceAction,
        owner: &'static str,
    },
}

impl AuthError {
    pub fn action(&self) -> MarketplaceAction {
        match self {
            AuthError::RoleNotPermitted { action, .. } | AuthError::NotOwner { action, .. } => {
                *action
            }
        }
    }
}
