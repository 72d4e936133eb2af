use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use serde_json::json;
use tracing::instrument;

use crate::entity::integration_credential::{TEST_STATUS_FAILED, TEST_STATUS_SUCCESS};
use crate::entity::{integration_credential, integration_test_log, user_integration};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::audit::append_audit;
use crate::handlers::integration::find_integration;
use crate::models::credential::{
    CreateCredentialRequest, CredentialListQuery, CredentialResponse, TestCredentialRequest,
    TestCredentialResponse, validate_secrets,
};
use crate::models::form_schema::fields_for;
use crate::probes::{self, ProbeError};
use crate::state::AppState;
use crate::utils::crypto;

#[utoipa::path(
    post,
    path = "/",
    tag = "Credentials",
    operation_id = "createCredential",
    summary = "Save a credential for an integration",
    description = "Validates the secret map against the integration's form schema, encrypts it, and stores the credential as `untested`. Requires `credential:manage` permission.",
    request_body = CreateCredentialRequest,
    responses(
        (status = 201, description = "Credential saved", body = CredentialResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Integration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(integration_id = payload.integration_id))]
pub async fn create_credential(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCredentialRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("credential:manage")?;

    let integration = find_integration(&state.db, payload.integration_id).await?;

    let schema = fields_for(&integration.slug);
    validate_secrets(&payload.secrets, &schema)?;

    let key = secrets_key(&state)?;
    let encrypted = crypto::encrypt_secrets(&payload.secrets, &key)
        .map_err(|e| AppError::Internal(format!("Secret encryption error: {e}")))?;

    let mut field_names: Vec<String> = payload.secrets.keys().cloned().collect();
    field_names.sort();

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let new_credential = integration_credential::ActiveModel {
        user_id: Set(auth_user.user_id),
        integration_id: Set(integration.id),
        secrets: Set(encrypted),
        last_tested_at: Set(None),
        last_test_status: Set(integration_credential::TEST_STATUS_UNTESTED.to_string()),
        last_test_error: Set(None),
        expires_at: Set(payload.expires_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_credential.insert(&txn).await?;

    append_audit(
        &txn,
        auth_user.user_id,
        integration.id,
        "credential_created",
        json!({"credential_id": model.id, "fields": field_names}),
    )
    .await?;

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CredentialResponse::from_model(model, field_names)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Credentials",
    operation_id = "listCredentials",
    summary = "List the caller's credentials",
    description = "Returns the caller's credentials, newest first, optionally restricted to one integration. Secret values are never returned; only the stored field names.",
    params(CredentialListQuery),
    responses(
        (status = 200, description = "Credentials", body = Vec<CredentialResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_credentials(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CredentialListQuery>,
) -> Result<Json<Vec<CredentialResponse>>, AppError> {
    auth_user.require_permission("credential:manage")?;

    let mut select = integration_credential::Entity::find()
        .filter(integration_credential::Column::UserId.eq(auth_user.user_id));
    if let Some(integration_id) = query.integration_id {
        select =
            select.filter(integration_credential::Column::IntegrationId.eq(integration_id));
    }

    let rows = select
        .order_by_desc(integration_credential::Column::CreatedAt)
        .order_by_desc(integration_credential::Column::Id)
        .all(&state.db)
        .await?;

    let key = secrets_key(&state)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = crypto::decrypt_secrets(&row.secrets, &key)
            .map_err(|e| AppError::Internal(format!("Secret decryption error: {e}")))?;
        out.push(CredentialResponse::from_model(
            row,
            fields.into_keys().collect(),
        ));
    }

    Ok(Json(out))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Credentials",
    operation_id = "deleteCredential",
    summary = "Delete a credential",
    description = "Permanently deletes one of the caller's credentials. Requires `credential:manage` permission. Returns 409 CONFLICT while an installed integration still references the credential.",
    params(("id" = i32, Path, description = "Credential ID")),
    responses(
        (status = 204, description = "Credential deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Credential not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Credential is installed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_credential(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("credential:manage")?;

    let txn = state.db.begin().await?;
    let credential = find_credential_owned(&txn, id, auth_user.user_id).await?;

    let installed = user_integration::Entity::find()
        .filter(user_integration::Column::CredentialId.eq(credential.id))
        .count(&txn)
        .await?;
    if installed > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a credential while the integration is installed".into(),
        ));
    }

    integration_credential::Entity::delete_by_id(credential.id)
        .exec(&txn)
        .await?;

    append_audit(
        &txn,
        auth_user.user_id,
        credential.integration_id,
        "credential_deleted",
        json!({"credential_id": credential.id}),
    )
    .await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/test",
    tag = "Credentials",
    operation_id = "testCredential",
    summary = "Probe a credential against its provider",
    description = "Sends one minimal authenticated request to the provider and records the outcome (status, error payload, latency) on the credential row plus a test log entry. A rejected credential is a normal 200 response with `success: false`; only unknown slugs are 501.",
    request_body = TestCredentialRequest,
    responses(
        (status = 200, description = "Probe ran", body = TestCredentialResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Credential not found (NOT_FOUND)", body = ErrorBody),
        (status = 501, description = "No probe for this integration (NOT_IMPLEMENTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(credential_id = payload.credential_id))]
pub async fn test_credential(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TestCredentialRequest>,
) -> Result<Json<TestCredentialResponse>, AppError> {
    auth_user.require_permission("credential:manage")?;

    let credential =
        find_credential_owned(&state.db, payload.credential_id, auth_user.user_id).await?;
    let integration = find_integration(&state.db, credential.integration_id).await?;

    let key = secrets_key(&state)?;
    let secrets = crypto::decrypt_secrets(&credential.secrets, &key)
        .map_err(|e| AppError::Internal(format!("Secret decryption error: {e}")))?;

    let outcome = probes::run(&state.http, &state.config.probes, &integration.slug, &secrets).await;
    let now = chrono::Utc::now();

    // The log row is appended whatever the probe said, including for
    // integrations that have no probe at all.
    if let Err(err @ ProbeError::Unsupported(_)) = &outcome.result {
        let message = err.to_string();
        append_test_log(
            &state.db,
            &credential,
            false,
            outcome.latency_ms,
            Some(message.clone()),
            now,
        )
        .await?;
        return Err(AppError::NotImplemented(message));
    }

    let (success, error_payload) = match &outcome.result {
        Ok(()) => (true, None),
        Err(err) => {
            let mut payload = json!({"message": err.to_string()});
            if let Some(status) = err.provider_status() {
                payload["provider_status"] = json!(status);
            }
            (false, Some(payload))
        }
    };

    let status = if success {
        TEST_STATUS_SUCCESS
    } else {
        TEST_STATUS_FAILED
    };

    let txn = state.db.begin().await?;

    let mut active: integration_credential::ActiveModel = credential.clone().into();
    active.last_tested_at = Set(Some(now));
    active.last_test_status = Set(status.to_string());
    active.last_test_error = Set(error_payload.clone());
    active.updated_at = Set(now);
    active.update(&txn).await?;

    append_test_log(
        &txn,
        &credential,
        success,
        outcome.latency_ms,
        error_payload
            .as_ref()
            .and_then(|e| e["message"].as_str().map(String::from)),
        now,
    )
    .await?;

    append_audit(
        &txn,
        auth_user.user_id,
        credential.integration_id,
        "credential_tested",
        json!({
            "credential_id": credential.id,
            "success": success,
            "latency_ms": outcome.latency_ms,
        }),
    )
    .await?;

    txn.commit().await?;

    Ok(Json(TestCredentialResponse {
        success,
        status: status.to_string(),
        latency_ms: outcome.latency_ms,
        error: error_payload,
    }))
}

pub(crate) async fn find_credential_owned<C: ConnectionTrait>(
    db: &C,
    id: i32,
    user_id: i32,
) -> Result<integration_credential::Model, AppError> {
    let credential = integration_credential::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Credential not found".into()))?;

    // Foreign rows are indistinguishable from absent ones.
    if credential.user_id != user_id {
        return Err(AppError::NotFound("Credential not found".into()));
    }

    Ok(credential)
}

fn secrets_key(state: &AppState) -> Result<Vec<u8>, AppError> {
    crypto::decode_key(&state.config.crypto.secrets_key)
        .map_err(|e| AppError::Internal(format!("Secrets key misconfigured: {e}")))
}

async fn append_test_log<C: ConnectionTrait>(
    db: &C,
    credential: &integration_credential::Model,
    success: bool,
    latency_ms: i64,
    error: Option<String>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), AppError> {
    integration_test_log::ActiveModel {
        credential_id: Set(credential.id),
        integration_id: Set(credential.integration_id),
        user_id: Set(credential.user_id),
        success: Set(success),
        latency_ms: Set(latency_ms),
        error: Set(error),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
