use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::Pagination;

/// A platform user, as seen by the user-management screens.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    #[schema(example = "member")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// Request body for changing a user's role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    #[schema(example = "admin")]
    pub role: String,
}

pub fn validate_update_role(req: &UpdateRoleRequest) -> Result<(), AppError> {
    if req.role.trim().is_empty() {
        return Err(AppError::Validation("Role must not be empty".into()));
    }
    Ok(())
}
