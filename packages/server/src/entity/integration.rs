use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Static catalog of third-party providers the platform can connect to.
/// Seeded at startup; read-only at runtime.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    /// e.g. "llm", "transcription"
    pub category: String,
    /// e.g. "api_key"
    pub auth_type: String,

    #[sea_orm(has_many)]
    pub credentials: HasMany<super::integration_credential::Entity>,

    #[sea_orm(has_many)]
    pub installations: HasMany<super::user_integration::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
