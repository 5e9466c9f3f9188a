//! Free-tier quota, subscription status, and access codes.
//!
//! Without an active subscription a user gets a fixed number of generations per
//! feature. Redeeming an access code activates a 30-day subscription. All state
//! lives in the injected key-value store.

mod codes;

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::store::{self, KeyValueStore, StoreError, keys};

pub use codes::{issue_code, redeem_code};

/// Length of a subscription activated by an access code.
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// A gated feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Notes,
    Questions,
}

impl Feature {
    /// Free generations allowed without a subscription.
    pub fn free_limit(self) -> u32 {
        match self {
            Feature::Notes => 2,
            Feature::Questions => 1,
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Feature::Notes => "study notes",
            Feature::Questions => "question sets",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Notes => "notes",
            Feature::Questions => "questions",
        }
    }
}

/// Per-feature generation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub notes: u32,
    #[serde(default)]
    pub questions: u32,
}

impl UsageStats {
    pub fn used(&self, feature: Feature) -> u32 {
        match feature {
            Feature::Notes => self.notes,
            Feature::Questions => self.questions,
        }
    }

    fn increment(&mut self, feature: Feature) {
        match feature {
            Feature::Notes => self.notes = self.notes.saturating_add(1),
            Feature::Questions => self.questions = self.questions.saturating_add(1),
        }
    }
}

/// Subscription plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Basic => write!(f, "basic"),
            Plan::Pro => write!(f, "pro"),
        }
    }
}

/// An activated subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: Plan,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Errors from access-code operations.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid access code")]
    InvalidCode,
    #[error("Access code has already been used")]
    AlreadyUsed,
    #[error("Access code has expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Current subscription (only if still active) and usage counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessStatus {
    pub subscription: Option<Subscription>,
    pub usage: UsageStats,
}

impl AccessStatus {
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

/// Outcome of a feature check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureAccess {
    pub allowed: bool,
    /// Remaining free generations; `None` when subscribed.
    pub usage_left: Option<u32>,
    pub message: Option<String>,
}

/// Read subscription and usage from the store. Expired subscriptions are ignored.
pub fn status(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<AccessStatus, StoreError> {
    let subscription = store::get_as::<Subscription>(store, keys::SUBSCRIPTION)?
        .filter(|s| s.is_active(now));
    let usage = store::get_as::<UsageStats>(store, keys::USAGE_STATS)?.unwrap_or_default();
    Ok(AccessStatus {
        subscription,
        usage,
    })
}

fn evaluate(status: &AccessStatus, feature: Feature) -> FeatureAccess {
    if status.is_subscribed() {
        return FeatureAccess {
            allowed: true,
            usage_left: None,
            message: None,
        };
    }
    let limit = feature.free_limit();
    let used = status.usage.used(feature);
    if used < limit {
        FeatureAccess {
            allowed: true,
            usage_left: Some(limit - used),
            message: None,
        }
    } else {
        FeatureAccess {
            allowed: false,
            usage_left: Some(0),
            message: Some(format!(
                "You've reached your free limit of {} {}. Subscribe to create unlimited {}.",
                limit,
                feature.unit(),
                feature.as_str()
            )),
        }
    }
}

/// Whether `feature` may be used now. A store failure never blocks the user.
pub fn check_feature(
    store: &dyn KeyValueStore,
    feature: Feature,
    now: DateTime<Utc>,
) -> FeatureAccess {
    match status(store, now) {
        Ok(status) => evaluate(&status, feature),
        Err(e) => {
            log::warn!("Error checking feature access: {}", e);
            FeatureAccess {
                allowed: true,
                usage_left: None,
                message: None,
            }
        }
    }
}

/// Count one generation of `feature`. Returns the updated counters.
pub fn track_usage(store: &dyn KeyValueStore, feature: Feature) -> Result<UsageStats, StoreError> {
    let mut usage = store::get_as::<UsageStats>(store, keys::USAGE_STATS)?.unwrap_or_default();
    usage.increment(feature);
    store::set_as(store, keys::USAGE_STATS, &usage)?;
    log::info!("Usage for {}: {}", feature.as_str(), usage.used(feature));
    Ok(usage)
}

/// Write a fresh subscription for `plan`, replacing any existing one.
fn activate(
    store: &dyn KeyValueStore,
    plan: Plan,
    now: DateTime<Utc>,
) -> Result<Subscription, StoreError> {
    let subscription = Subscription {
        plan,
        activated_at: now,
        expires_at: now + Duration::days(SUBSCRIPTION_DAYS),
    };
    store::set_as(store, keys::SUBSCRIPTION, &subscription)?;
    Ok(subscription)
}
