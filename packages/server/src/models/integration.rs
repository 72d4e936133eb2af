use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::status::IntegrationStatus;

/// Catalog entry for one third-party provider.
#[derive(Serialize, utoipa::ToSchema)]
pub struct IntegrationResponse {
    pub id: i32,
    #[schema(example = "openai")]
    pub slug: String,
    #[schema(example = "OpenAI")]
    pub name: String,
    #[schema(example = "llm")]
    pub category: String,
    #[schema(example = "api_key")]
    pub auth_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::integration::Model> for IntegrationResponse {
    fn from(m: crate::entity::integration::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            name: m.name,
            category: m.category,
            auth_type: m.auth_type,
            created_at: m.created_at,
        }
    }
}

/// Request body for the status endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StatusRequest {
    pub integration_id: i32,
}

/// Computed status of one integration for the calling user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub integration_id: i32,
    #[schema(example = "active")]
    pub status: IntegrationStatus,
    pub checked_at: DateTime<Utc>,
}
