use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    UpdateRoleRequest, UserListResponse, UserResponse, validate_update_role,
};
use crate::models::shared::{PageQuery, Pagination};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    operation_id = "listUsers",
    summary = "List platform users",
    description = "Returns all users, oldest first. Requires `user:manage` permission.",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let (page, per_page) = query.clamped();

    let select = user::Entity::find();
    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let rows = select
        .order_by_asc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
        data: rows.into_iter().map(UserResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/role",
    tag = "Admin",
    operation_id = "updateUserRole",
    summary = "Change a user's role",
    description = "Assigns one of the seeded roles to a user. Takes effect on the user's next login. Requires `user:manage` permission.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User or role not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;
    validate_update_role(&payload)?;

    let role_name = payload.role.trim().to_string();

    let txn = state.db.begin().await?;

    role::Entity::find_by_id(role_name.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role '{role_name}' not found")))?;

    let target = user::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = target.into();
    active.role = Set(role_name);
    let model = active.update(&txn).await?;

    txn.commit().await?;
    Ok(Json(UserResponse::from(model)))
}
