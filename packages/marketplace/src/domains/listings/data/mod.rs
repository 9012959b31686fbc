//! Listing payloads as they arrive from the host, and their validated forms.
//!
//! Validation is pure and reports every violated field at once.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use typed_builder::TypedBuilder;
use url::Url;

use crate::common::ValidationErrors;
use crate::config::Limits;
use crate::domains::listings::models::Condition;

/// Raw create-listing payload
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    #[builder(setter(into))]
    pub title: String,
    #[builder(setter(into))]
    pub description: String,
    pub price: Decimal,
    #[builder(setter(into))]
    pub condition: String,
    pub images: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    pub tags: Vec<String>,
    /// Keep the listing as a private draft instead of submitting it
    #[serde(default)]
    #[builder(default)]
    pub draft: bool,
}

/// A create payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub condition: Condition,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,
    pub draft: bool,
}

impl ListingInput {
    pub fn validate(&self, limits: &Limits) -> Result<ValidListing, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require_non_blank("title", &self.title);
        errors.require_non_blank("description", &self.description);
        errors.require_money("price", self.price);
        let condition = parse_condition(&self.condition, &mut errors);
        check_images(&self.images, limits, &mut errors);
        let tags = normalize_tags(&self.tags, &mut errors);

        let Some(condition) = condition else {
            return Err(errors);
        };

        errors.into_result(ValidListing {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            condition,
            images: self.images.clone(),
            tags,
            draft: self.draft,
        })
    }
}

/// Raw update-listing payload. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub condition: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    /// Never accepted: status only moves through lifecycle operations
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub condition: Option<Condition>,
    pub images: Option<Vec<String>>,
    pub tags: Option<BTreeSet<String>>,
}

impl ListingPatch {
    pub fn validate(&self, limits: &Limits) -> Result<ValidListingPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.status.is_some() {
            errors.push(
                "status",
                "cannot be changed by an update; use a lifecycle operation",
            );
        }
        if let Some(title) = &self.title {
            errors.require_non_blank("title", title);
        }
        if let Some(description) = &self.description {
            errors.require_non_blank("description", description);
        }
        if let Some(price) = self.price {
            errors.require_money("price", price);
        }
        let condition = self
            .condition
            .as_deref()
            .and_then(|raw| parse_condition(raw, &mut errors));
        if let Some(images) = &self.images {
            check_images(images, limits, &mut errors);
        }
        let tags = self
            .tags
            .as_ref()
            .map(|tags| normalize_tags(tags, &mut errors));

        errors.into_result(ValidListingPatch {
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            description: self.description.as_ref().map(|d| d.trim().to_string()),
            price: self.price,
            condition,
            images: self.images.clone(),
            tags,
        })
    }
}

fn parse_condition(raw: &str, errors: &mut ValidationErrors) -> Option<Condition> {
    match raw.parse::<Condition>() {
        Ok(condition) => Some(condition),
        Err(_) => {
            errors.push("condition", "must be one of NEW, LIKE_NEW, GOOD, FAIR");
            None
        }
    }
}

fn check_images(images: &[String], limits: &Limits, errors: &mut ValidationErrors) {
    let max = limits.max_images_per_listing;
    if images.is_empty() || images.len() > max {
        errors.push(
            "images",
            format!("must contain between 1 and {} images (got {})", max, images.len()),
        );
    }

    for (index, image) in images.iter().enumerate() {
        let valid = Url::parse(image)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(&format!("images[{}]", index), "must be an absolute http(s) URL");
        }
    }
}

/// Trim, lower-case, and deduplicate tags
fn normalize_tags(tags: &[String], errors: &mut ValidationErrors) -> BTreeSet<String> {
    let mut normalized = BTreeSet::new();
    for (index, tag) in tags.iter().enumerate() {
        let tag = tag.trim();
        if tag.is_empty() {
            errors.push(&format!("tags[{}]", index), "must not be blank");
            continue;
        }
        normalized.insert(tag.to_lowercase());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ListingInput {
        ListingInput::builder()
            .title("Road bike")
            .description("54cm frame, new tyres")
            .price(Decimal::new(350, 0))
            .condition("GOOD")
            .images(vec!["https://img.example.com/bike.jpg".to_string()])
            .tags(vec![" Cycling ".to_string(), "cycling".to_string()])
            .build()
    }

    #[test]
    fn valid_input_is_normalized() {
        let valid = input().validate(&Limits::default()).unwrap();
        assert_eq!(valid.condition, Condition::Good);
        assert_eq!(valid.tags.len(), 1);
        assert!(valid.tags.contains("cycling"));
        assert!(!valid.draft);
    }

    #[test]
    fn every_violation_is_reported() {
        let mut bad = input();
        bad.title = " ".to_string();
        bad.description = String::new();
        bad.price = Decimal::new(-1, 0);
        bad.condition = "BROKEN".to_string();
        bad.images = vec![];

        let errors = bad.validate(&Limits::default()).unwrap_err();
        for field in ["title", "description", "price", "condition", "images"] {
            assert!(errors.has_field(field), "missing violation for {}", field);
        }
    }

    #[test]
    fn too_many_images_is_rejected() {
        let limits = Limits {
            max_images_per_listing: 2,
            ..Limits::default()
        };
        let mut bad = input();
        bad.images = (0..3)
            .map(|i| format!("https://img.example.com/{}.jpg", i))
            .collect();

        let errors = bad.validate(&limits).unwrap_err();
        assert!(errors.has_field("images"));

        bad.images.pop();
        assert!(bad.validate(&limits).is_ok());
    }

    #[test]
    fn non_http_images_are_rejected() {
        let mut bad = input();
        bad.images = vec!["ftp://files.example.com/a.jpg".to_string(), "nope".to_string()];

        let errors = bad.validate(&Limits::default()).unwrap_err();
        assert!(errors.has_field("images[0]"));
        assert!(errors.has_field("images[1]"));
    }

    #[test]
    fn patch_rejects_status() {
        let patch = ListingPatch {
            status: Some("SOLD".to_string()),
            price: Some(Decimal::new(10, 0)),
            ..ListingPatch::default()
        };
        let errors = patch.validate(&Limits::default()).unwrap_err();
        assert!(errors.has_field("status"));
        assert_eq!(errors.violations().len(), 1);
    }

    #[test]
    fn patch_validates_present_fields_only() {
        let patch = ListingPatch {
            title: Some("Gravel bike".to_string()),
            ..ListingPatch::default()
        };
        let valid = patch.validate(&Limits::default()).unwrap();
        assert_eq!(valid.title.as_deref(), Some("Gravel bike"));
        assert!(valid.images.is_none());
        assert!(valid.price.is_none());
    }

    #[test]
    fn price_must_fit_the_price_column() {
        let mut bad = input();
        bad.price = Decimal::new(19_999, 3);
        let errors = bad.validate(&Limits::default()).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "price: must have at most 2 decimal places"
        );

        let patch = ListingPatch {
            price: Some(Decimal::from(5_000_000_000_000i64)),
            ..ListingPatch::default()
        };
        let errors = patch.validate(&Limits::default()).unwrap_err();
        assert!(errors.has_field("price"));
    }
}
