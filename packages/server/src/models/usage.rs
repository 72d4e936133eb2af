use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::validate_non_negative;

/// Request body for recording one usage sample.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordUsageRequest {
    pub integration_id: i32,
    #[schema(example = 1250)]
    pub tokens_used: i64,
    #[schema(example = 3)]
    pub cost_cents: i64,
}

pub fn validate_record_usage(req: &RecordUsageRequest) -> Result<(), AppError> {
    validate_non_negative(req.tokens_used, "tokens_used")?;
    validate_non_negative(req.cost_cents, "cost_cents")?;
    Ok(())
}

/// A recorded usage sample.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UsageLogResponse {
    pub id: i32,
    pub integration_id: i32,
    pub tokens_used: i64,
    pub cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::api_usage_log::Model> for UsageLogResponse {
    fn from(m: crate::entity::api_usage_log::Model) -> Self {
        Self {
            id: m.id,
            integration_id: m.integration_id,
            tokens_used: m.tokens_used,
            cost_cents: m.cost_cents,
            created_at: m.created_at,
        }
    }
}

/// Query parameters for the usage summary endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UsageSummaryQuery {
    pub integration_id: i32,
}

/// Rolling-window totals the status resolver checks against the quotas.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UsageSummaryResponse {
    pub integration_id: i32,
    #[schema(example = 30)]
    pub window_days: i64,
    pub tokens_used: i64,
    pub cost_cents: i64,
    pub tokens_limit: i64,
    pub cost_cents_limit: i64,
}
