use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of integration lifecycle actions. Rows are never
/// mutated and there is no delete path.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub integration_id: i32,
    #[sea_orm(belongs_to, from = "integration_id", to = "id")]
    pub integration: HasOne<super::integration::Entity>,

    /// e.g. `credential_created`, `credential_tested`, `installed`.
    pub action: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub detail: serde_json::Value,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
