use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::*;
use serde_json::json;
use tracing::instrument;

use crate::entity::integration_credential::TEST_STATUS_SUCCESS;
use crate::entity::user_integration::{self, STATUS_ACTIVE, STATUS_PAUSED};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::audit::append_audit;
use crate::handlers::credential::find_credential_owned;
use crate::handlers::integration::find_integration;
use crate::models::manage::{
    InstallationResponse, ManageAction, ManageIntegrationRequest, validate_manage_request,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/manage",
    tag = "Integrations",
    operation_id = "manageIntegration",
    summary = "Install, uninstall, pause, or resume an integration",
    description = "Single lifecycle endpoint keyed by the `action` field. Install requires a credential whose last test succeeded and rejects duplicate installs; the other actions mutate or delete the caller's installation. Every action writes one audit row in the same transaction as the mutation. Requires `integration:install` permission.",
    request_body = ManageIntegrationRequest,
    responses(
        (status = 200, description = "Installation updated (pause/resume)", body = InstallationResponse),
        (status = 201, description = "Integration installed", body = InstallationResponse),
        (status = 204, description = "Integration uninstalled"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Integration, credential, or installation not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already installed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(action = ?payload.action, integration_id = payload.integration_id)
)]
pub async fn manage_integration(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ManageIntegrationRequest>,
) -> Result<Response, AppError> {
    auth_user.require_permission("integration:install")?;
    validate_manage_request(&payload)?;

    match payload.action {
        ManageAction::Install => install(&state, &auth_user, &payload).await,
        ManageAction::Uninstall => uninstall(&state, &auth_user, payload.integration_id).await,
        ManageAction::Pause => {
            set_status(&state, &auth_user, payload.integration_id, STATUS_PAUSED, "paused").await
        }
        ManageAction::Resume => {
            set_status(&state, &auth_user, payload.integration_id, STATUS_ACTIVE, "resumed").await
        }
    }
}

async fn install(
    state: &AppState,
    auth_user: &AuthUser,
    payload: &ManageIntegrationRequest,
) -> Result<Response, AppError> {
    // Presence is checked by validate_manage_request.
    let credential_id = payload
        .credential_id
        .ok_or_else(|| AppError::Validation("credential_id is required for install".into()))?;

    let txn = state.db.begin().await?;

    let integration = find_integration(&txn, payload.integration_id).await?;
    let credential = find_credential_owned(&txn, credential_id, auth_user.user_id).await?;

    if credential.integration_id != integration.id {
        return Err(AppError::Validation(
            "Credential does not belong to this integration".into(),
        ));
    }
    if credential.last_test_status != TEST_STATUS_SUCCESS {
        return Err(AppError::Validation(
            "Credential must pass a test before the integration can be installed".into(),
        ));
    }

    let new_installation = user_integration::ActiveModel {
        user_id: Set(auth_user.user_id),
        integration_id: Set(integration.id),
        credential_id: Set(credential.id),
        status: Set(STATUS_ACTIVE.to_string()),
        config: Set(payload.config.clone().unwrap_or_else(|| json!({}))),
        installed_at: Set(chrono::Utc::now()),
        installed_by: Set(auth_user.user_id),
        ..Default::default()
    };

    let model = match new_installation.insert(&txn).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(
                "Integration is already installed".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    append_audit(
        &txn,
        auth_user.user_id,
        integration.id,
        "installed",
        json!({"user_integration_id": model.id, "credential_id": credential.id}),
    )
    .await?;

    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(InstallationResponse::from(model))).into_response())
}

async fn uninstall(
    state: &AppState,
    auth_user: &AuthUser,
    integration_id: i32,
) -> Result<Response, AppError> {
    let txn = state.db.begin().await?;
    let installation = find_installation(&txn, auth_user.user_id, integration_id).await?;

    user_integration::Entity::delete_by_id(installation.id)
        .exec(&txn)
        .await?;

    append_audit(
        &txn,
        auth_user.user_id,
        integration_id,
        "uninstalled",
        json!({"user_integration_id": installation.id}),
    )
    .await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn set_status(
    state: &AppState,
    auth_user: &AuthUser,
    integration_id: i32,
    status: &str,
    action: &str,
) -> Result<Response, AppError> {
    let txn = state.db.begin().await?;
    let installation = find_installation(&txn, auth_user.user_id, integration_id).await?;

    let mut active: user_integration::ActiveModel = installation.into();
    active.status = Set(status.to_string());
    let model = active.update(&txn).await?;

    append_audit(
        &txn,
        auth_user.user_id,
        integration_id,
        action,
        json!({"user_integration_id": model.id, "status": status}),
    )
    .await?;

    txn.commit().await?;
    Ok(Json(InstallationResponse::from(model)).into_response())
}

/// The caller's installation for an integration. Scoped by user id, so a
/// foreign installation is indistinguishable from an absent one.
async fn find_installation<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    integration_id: i32,
) -> Result<user_integration::Model, AppError> {
    user_integration::Entity::find()
        .filter(user_integration::Column::UserId.eq(user_id))
        .filter(user_integration::Column::IntegrationId.eq(integration_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Integration is not installed".into()))
}
