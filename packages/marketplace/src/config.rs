use anyhow::{bail, Context, Result};
use chrono::Duration;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use crate::common::error::Feature;
use crate::common::MarketplaceError;

/// A hundred years; longer lifetimes overflow timestamp arithmetic.
pub const MAX_LISTING_TTL_DAYS: i64 = 36_500;

/// Marketplace rules supplied by the host, validated once at startup.
///
/// Immutable after loading; every engine operation receives it by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketplaceConfig {
    pub features: FeatureFlags,
    pub roles: RolePolicy,
    pub limits: Limits,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    /// New listings skip the approval queue
    pub auto_approval: bool,
    pub messaging: bool,
    pub offers: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_approval: false,
            messaging: true,
            offers: true,
        }
    }
}

impl FeatureFlags {
    pub fn require(&self, feature: Feature) -> Result<(), MarketplaceError> {
        let enabled = match feature {
            Feature::Offers => self.offers,
            Feature::Messaging => self.messaging,
        };
        if enabled {
            Ok(())
        } else {
            Err(MarketplaceError::FeatureDisabled(feature))
        }
    }
}

/// Role names allowed to perform role-gated actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RolePolicy {
    pub can_create_listings: BTreeSet<String>,
    pub can_delete_listings: BTreeSet<String>,
    pub can_approve_listings: BTreeSet<String>,
    pub can_make_offers: BTreeSet<String>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self {
            can_create_listings: role_set(&["user", "admin"]),
            can_delete_listings: role_set(&["admin", "moderator"]),
            can_approve_listings: role_set(&["admin", "moderator"]),
            can_make_offers: role_set(&["user", "admin"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub max_listings_per_user: usize,
    pub max_images_per_listing: usize,
    pub max_offers_per_listing: usize,
    pub max_messages_per_listing: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_listings_per_user: 50,
            max_images_per_listing: 10,
            max_offers_per_listing: 20,
            max_messages_per_listing: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lifecycle {
    /// Open listings expire this many days after creation
    pub listing_ttl_days: i64,
    /// How often a host re-runs an operation after a stale-snapshot conflict
    pub commit_retries: u32,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            listing_ttl_days: 30,
            commit_retries: 3,
        }
    }
}

impl Lifecycle {
    /// Listing time-to-live, clamped to `1..=MAX_LISTING_TTL_DAYS` for
    /// configs that were never validated.
    pub fn listing_ttl(&self) -> Duration {
        Duration::days(self.listing_ttl_days.clamp(1, MAX_LISTING_TTL_DAYS))
    }
}

impl MarketplaceConfig {
    /// Load marketplace rules from `MARKETPLACE_*` environment variables.
    ///
    /// Unset variables keep their defaults. Role lists are comma-separated.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let defaults = Self::default();
        let config = Self {
            features: FeatureFlags {
                auto_approval: env_or("MARKETPLACE_AUTO_APPROVAL", defaults.features.auto_approval)?,
                messaging: env_or("MARKETPLACE_FEATURE_MESSAGING", defaults.features.messaging)?,
                offers: env_or("MARKETPLACE_FEATURE_OFFERS", defaults.features.offers)?,
            },
            roles: RolePolicy {
                can_create_listings: env_roles(
                    "MARKETPLACE_ROLES_CAN_CREATE_LISTINGS",
                    defaults.roles.can_create_listings,
                ),
                can_delete_listings: env_roles(
                    "MARKETPLACE_ROLES_CAN_DELETE_LISTINGS",
                    defaults.roles.can_delete_listings,
                ),
                can_approve_listings: env_roles(
                    "MARKETPLACE_ROLES_CAN_APPROVE_LISTINGS",
                    defaults.roles.can_approve_listings,
                ),
                can_make_offers: env_roles(
                    "MARKETPLACE_ROLES_CAN_MAKE_OFFERS",
                    defaults.roles.can_make_offers,
                ),
            },
            limits: Limits {
                max_listings_per_user: env_or(
                    "MARKETPLACE_MAX_LISTINGS_PER_USER",
                    defaults.limits.max_listings_per_user,
                )?,
                max_images_per_listing: env_or(
                    "MARKETPLACE_MAX_IMAGES_PER_LISTING",
                    defaults.limits.max_images_per_listing,
                )?,
                max_offers_per_listing: env_or(
                    "MARKETPLACE_MAX_OFFERS_PER_LISTING",
                    defaults.limits.max_offers_per_listing,
                )?,
                max_messages_per_listing: env_or(
                    "MARKETPLACE_MAX_MESSAGES_PER_LISTING",
                    defaults.limits.max_messages_per_listing,
                )?,
            },
            lifecycle: Lifecycle {
                listing_ttl_days: env_or(
                    "MARKETPLACE_LISTING_TTL_DAYS",
                    defaults.lifecycle.listing_ttl_days,
                )?,
                commit_retries: env_or(
                    "MARKETPLACE_COMMIT_RETRIES",
                    defaults.lifecycle.commit_retries,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse rules from a JSON document (same shape as the serialized config).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid marketplace config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engines cannot run with.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("maxListingsPerUser", self.limits.max_listings_per_user),
            ("maxImagesPerListing", self.limits.max_images_per_listing),
            ("maxOffersPerListing", self.limits.max_offers_per_listing),
            ("maxMessagesPerListing", self.limits.max_messages_per_listing),
        ];
        for (name, value) in limits {
            if value == 0 {
                bail!("limits.{} must be a positive integer", name);
            }
        }

        let roles = [
            ("canCreateListings", &self.roles.can_create_listings),
            ("canDeleteListings", &self.roles.can_delete_listings),
            ("canApproveListings", &self.roles.can_approve_listings),
            ("canMakeOffers", &self.roles.can_make_offers),
        ];
        for (name, set) in roles {
            if set.is_empty() {
                bail!("roles.{} must name at least one role", name);
            }
        }

        if !(1..=MAX_LISTING_TTL_DAYS).contains(&self.lifecycle.listing_ttl_days) {
            bail!(
                "lifecycle.listingTtlDays must be between 1 and {}",
                MAX_LISTING_TTL_DAYS
            );
        }
        if self.lifecycle.commit_retries == 0 {
            bail!("lifecycle.commitRetries must be at least 1");
        }

        Ok(())
    }
}

/// Worker process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    /// Six-field cron expression (with seconds) for the expiry sweep
    pub expiry_sweep_cron: String,
    pub marketplace: MarketplaceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            expiry_sweep_cron: env::var("EXPIRY_SWEEP_CRON")
                .unwrap_or_else(|_| "0 */5 * * * *".to_string()),
            marketplace: MarketplaceConfig::from_env()
                .context("Failed to load marketplace rules")?,
        })
    }
}

fn role_set(roles: &[&str]) -> BTreeSet<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn env_roles(key: &str, default: BTreeSet<String>) -> BTreeSet<String> {
    match env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default,
    }
}
