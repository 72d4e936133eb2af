use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-call usage sample. The status resolver sums the trailing 30 days
/// of these on every request.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_usage_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub integration_id: i32,
    #[sea_orm(belongs_to, from = "integration_id", to = "id")]
    pub integration: HasOne<super::integration::Entity>,

    pub tokens_used: i64,
    pub cost_cents: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
