use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::integration_credential::{self, TEST_STATUS_FAILED};

/// 30-day token budget per (user, integration) pair.
pub const QUOTA_MAX_TOKENS: i64 = 1_000_000;
/// 30-day spend budget per (user, integration) pair, in cents.
pub const QUOTA_MAX_COST_CENTS: i64 = 10_000;
/// Length of the rolling usage window, in days.
pub const USAGE_WINDOW_DAYS: i64 = 30;

/// Computed health of an integration for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    NotConfigured,
    Untested,
    Error,
    QuotaExceeded,
    Active,
}

/// Summed usage over the trailing window.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageTotals {
    pub tokens_used: i64,
    pub cost_cents: i64,
}

impl UsageTotals {
    pub fn over_quota(&self) -> bool {
        self.tokens_used > QUOTA_MAX_TOKENS || self.cost_cents > QUOTA_MAX_COST_CENTS
    }
}

/// Resolve the five-valued status from the most recent credential and the
/// trailing-window usage totals. Expiry takes precedence over a successful
/// last test.
pub fn resolve(
    credential: Option<&integration_credential::Model>,
    usage: &UsageTotals,
    now: DateTime<Utc>,
) -> IntegrationStatus {
    let Some(credential) = credential else {
        return IntegrationStatus::NotConfigured;
    };

    if credential.last_tested_at.is_none() {
        return IntegrationStatus::Untested;
    }

    if credential.last_test_status == TEST_STATUS_FAILED {
        return IntegrationStatus::Error;
    }

    if let Some(expires_at) = credential.expires_at
        && expires_at < now
    {
        return IntegrationStatus::Error;
    }

    if usage.over_quota() {
        return IntegrationStatus::QuotaExceeded;
    }

    IntegrationStatus::Active
}
