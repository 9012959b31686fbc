use serde::Deserialize;

use crate::common::ValidationErrors;

/// Raw post-message payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInput {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMessage {
    pub content: String,
}

impl MessageInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("content", &self.content);

        errors.into_result(ValidMessage {
            content: self.content.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        let errors = MessageInput::new(" \n ").validate().unwrap_err();
        assert!(errors.has_field("content"));
    }

    #[test]
    fn content_is_trimmed() {
        let valid = MessageInput::new("  Is this still available? ").validate().unwrap();
        assert_eq!(valid.content, "Is this still available?");
    }
}
