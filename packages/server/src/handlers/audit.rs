use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{integration_audit_log, integration_test_log};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::integration::find_integration_by_slug;
use crate::models::audit::{
    AuditLogListResponse, AuditLogResponse, TestLogListResponse, TestLogResponse,
};
use crate::models::shared::{PageQuery, Pagination};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{slug}/audit",
    tag = "Integrations",
    operation_id = "listAuditLog",
    summary = "List audit entries for an integration",
    description = "Returns the caller's audit entries for the integration, newest first. Users with `audit:view_all` see every user's entries.",
    params(("slug" = String, Path, description = "Integration slug"), PageQuery),
    responses(
        (status = 200, description = "Audit entries", body = AuditLogListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(slug = %slug))]
pub async fn list_audit_log(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AuditLogListResponse>, AppError> {
    let integration = find_integration_by_slug(&state.db, &slug).await?;

    let (page, per_page) = query.clamped();

    let mut select = integration_audit_log::Entity::find()
        .filter(integration_audit_log::Column::IntegrationId.eq(integration.id));
    if !auth_user.has_permission("audit:view_all") {
        select = select.filter(integration_audit_log::Column::UserId.eq(auth_user.user_id));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let rows = select
        .order_by_desc(integration_audit_log::Column::CreatedAt)
        .order_by_desc(integration_audit_log::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(AuditLogListResponse {
        data: rows.into_iter().map(AuditLogResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{slug}/test-logs",
    tag = "Integrations",
    operation_id = "listTestLogs",
    summary = "List the caller's probe history for an integration",
    params(("slug" = String, Path, description = "Integration slug"), PageQuery),
    responses(
        (status = 200, description = "Probe log entries", body = TestLogListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(slug = %slug))]
pub async fn list_test_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TestLogListResponse>, AppError> {
    let integration = find_integration_by_slug(&state.db, &slug).await?;

    let (page, per_page) = query.clamped();

    let select = integration_test_log::Entity::find()
        .filter(integration_test_log::Column::IntegrationId.eq(integration.id))
        .filter(integration_test_log::Column::UserId.eq(auth_user.user_id));

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let rows = select
        .order_by_desc(integration_test_log::Column::CreatedAt)
        .order_by_desc(integration_test_log::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(TestLogListResponse {
        data: rows.into_iter().map(TestLogResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

/// Append one audit row. Callers pass their open transaction so the entry
/// commits atomically with the mutation it records.
pub(crate) async fn append_audit<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    integration_id: i32,
    action: &str,
    detail: serde_json::Value,
) -> Result<(), AppError> {
    integration_audit_log::ActiveModel {
        user_id: Set(user_id),
        integration_id: Set(integration_id),
        action: Set(action.to_string()),
        detail: Set(detail),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
