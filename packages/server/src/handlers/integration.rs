use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{integration, integration_credential};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::usage::usage_totals;
use crate::models::form_schema::{FormSchemaResponse, fields_for};
use crate::models::integration::{IntegrationResponse, StatusRequest, StatusResponse};
use crate::state::AppState;
use crate::utils::status;

#[utoipa::path(
    get,
    path = "/",
    tag = "Integrations",
    operation_id = "listIntegrations",
    summary = "List the integration catalog",
    description = "Returns every catalogued provider, ordered by slug. The catalog is seeded at startup and read-only at runtime.",
    responses(
        (status = 200, description = "Catalog entries", body = Vec<IntegrationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_integrations(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<IntegrationResponse>>, AppError> {
    let rows = integration::Entity::find()
        .order_by_asc(integration::Column::Slug)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(IntegrationResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{slug}",
    tag = "Integrations",
    operation_id = "getIntegration",
    summary = "Get a catalog entry by slug",
    params(("slug" = String, Path, description = "Integration slug")),
    responses(
        (status = 200, description = "Catalog entry", body = IntegrationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(slug = %slug))]
pub async fn get_integration(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<IntegrationResponse>, AppError> {
    let model = find_integration_by_slug(&state.db, &slug).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{slug}/form-schema",
    tag = "Integrations",
    operation_id = "getFormSchema",
    summary = "Get the credential form schema for an integration",
    description = "Returns the input-field descriptors the credential dialog should render. Known providers have fixed schemas; any other catalogued slug gets a generic API-key field.",
    params(("slug" = String, Path, description = "Integration slug")),
    responses(
        (status = 200, description = "Form schema", body = FormSchemaResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(slug = %slug))]
pub async fn get_form_schema(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<FormSchemaResponse>, AppError> {
    let model = find_integration_by_slug(&state.db, &slug).await?;

    Ok(Json(FormSchemaResponse {
        fields: fields_for(&model.slug),
        slug: model.slug,
    }))
}

#[utoipa::path(
    post,
    path = "/status",
    tag = "Integrations",
    operation_id = "computeStatus",
    summary = "Compute the status of an integration for the calling user",
    description = "Reads the most recent credential and the trailing 30-day usage totals and returns one of: `not_configured`, `untested`, `error`, `quota_exceeded`, `active`. Side-effect free.",
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Computed status", body = StatusResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(integration_id = payload.integration_id))]
pub async fn compute_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let integration = find_integration(&state.db, payload.integration_id).await?;

    let now = chrono::Utc::now();
    let credential = latest_credential(&state.db, auth_user.user_id, integration.id).await?;
    let usage = usage_totals(
        &state.db,
        auth_user.user_id,
        integration.id,
        now - chrono::Duration::days(status::USAGE_WINDOW_DAYS),
    )
    .await?;

    Ok(Json(StatusResponse {
        integration_id: integration.id,
        status: status::resolve(credential.as_ref(), &usage, now),
        checked_at: now,
    }))
}

pub(crate) async fn find_integration<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<integration::Model, AppError> {
    integration::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Integration not found".into()))
}

pub(crate) async fn find_integration_by_slug<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<integration::Model, AppError> {
    integration::Entity::find()
        .filter(integration::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Integration not found".into()))
}

/// The most recently saved credential for a (user, integration) pair.
pub(crate) async fn latest_credential<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    integration_id: i32,
) -> Result<Option<integration_credential::Model>, AppError> {
    Ok(integration_credential::Entity::find()
        .filter(integration_credential::Column::UserId.eq(user_id))
        .filter(integration_credential::Column::IntegrationId.eq(integration_id))
        .order_by_desc(integration_credential::Column::CreatedAt)
        .order_by_desc(integration_credential::Column::Id)
        .one(db)
        .await?)
}
