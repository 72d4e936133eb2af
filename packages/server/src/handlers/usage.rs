use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::api_usage_log;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::integration::find_integration;
use crate::models::usage::{
    RecordUsageRequest, UsageLogResponse, UsageSummaryQuery, UsageSummaryResponse,
    validate_record_usage,
};
use crate::state::AppState;
use crate::utils::status::{
    QUOTA_MAX_COST_CENTS, QUOTA_MAX_TOKENS, USAGE_WINDOW_DAYS, UsageTotals,
};

#[utoipa::path(
    post,
    path = "/",
    tag = "Usage",
    operation_id = "recordUsage",
    summary = "Record one usage sample",
    description = "Appends a usage row for the calling user. The status resolver sums these over a rolling 30-day window when checking quotas. Requires `usage:record` permission.",
    request_body = RecordUsageRequest,
    responses(
        (status = 201, description = "Usage recorded", body = UsageLogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(integration_id = payload.integration_id))]
pub async fn record_usage(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecordUsageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("usage:record")?;
    validate_record_usage(&payload)?;

    let integration = find_integration(&state.db, payload.integration_id).await?;

    let model = api_usage_log::ActiveModel {
        user_id: Set(auth_user.user_id),
        integration_id: Set(integration.id),
        tokens_used: Set(payload.tokens_used),
        cost_cents: Set(payload.cost_cents),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(UsageLogResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/summary",
    tag = "Usage",
    operation_id = "usageSummary",
    summary = "Get the caller's rolling 30-day usage totals for an integration",
    params(UsageSummaryQuery),
    responses(
        (status = 200, description = "Usage totals", body = UsageSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(integration_id = query.integration_id))]
pub async fn usage_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UsageSummaryQuery>,
) -> Result<Json<UsageSummaryResponse>, AppError> {
    auth_user.require_permission("usage:view")?;

    let integration = find_integration(&state.db, query.integration_id).await?;

    let since = chrono::Utc::now() - chrono::Duration::days(USAGE_WINDOW_DAYS);
    let totals = usage_totals(&state.db, auth_user.user_id, integration.id, since).await?;

    Ok(Json(UsageSummaryResponse {
        integration_id: integration.id,
        window_days: USAGE_WINDOW_DAYS,
        tokens_used: totals.tokens_used,
        cost_cents: totals.cost_cents,
        tokens_limit: QUOTA_MAX_TOKENS,
        cost_cents_limit: QUOTA_MAX_COST_CENTS,
    }))
}

/// Sum usage rows for a (user, integration) pair since the window start.
pub(crate) async fn usage_totals<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    integration_id: i32,
    since: DateTime<Utc>,
) -> Result<UsageTotals, AppError> {
    let row: Option<(i64, i64)> = api_usage_log::Entity::find()
        .filter(api_usage_log::Column::UserId.eq(user_id))
        .filter(api_usage_log::Column::IntegrationId.eq(integration_id))
        .filter(api_usage_log::Column::CreatedAt.gte(since))
        .select_only()
        .column_as(
            Expr::cust("COALESCE(SUM(\"tokens_used\"), 0)::bigint"),
            "tokens_used",
        )
        .column_as(
            Expr::cust("COALESCE(SUM(\"cost_cents\"), 0)::bigint"),
            "cost_cents",
        )
        .into_tuple()
        .one(db)
        .await?;

    let (tokens_used, cost_cents) = row.unwrap_or((0, 0));
    Ok(UsageTotals {
        tokens_used,
        cost_cents,
    })
}
