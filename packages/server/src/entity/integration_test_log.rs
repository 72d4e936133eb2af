use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per credential probe, appended whether the probe passed or not.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_test_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub credential_id: i32,
    #[sea_orm(belongs_to, from = "credential_id", to = "id")]
    pub credential: HasOne<super::integration_credential::Entity>,

    pub integration_id: i32,
    #[sea_orm(belongs_to, from = "integration_id", to = "id")]
    pub integration: HasOne<super::integration::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub success: bool,
    pub latency_ms: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
