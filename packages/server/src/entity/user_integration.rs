use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAUSED: &str = "paused";
pub const STATUS_ERROR: &str = "error";

/// An installed (activated) integration. Existence of a row is the gating
/// "is this integration turned on" flag, independent of whether the
/// underlying credential still works.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_integration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "user_integration_pair")]
    pub user_id: i32,
    #[sea_orm(unique_key = "user_integration_pair")]
    pub integration_id: i32,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "integration_id", to = "id")]
    pub integration: HasOne<super::integration::Entity>,

    pub credential_id: i32,
    #[sea_orm(belongs_to, from = "credential_id", to = "id")]
    pub credential: HasOne<super::integration_credential::Entity>,

    /// One of: `active`, `paused`, `error`.
    pub status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub config: serde_json::Value,

    pub installed_at: DateTimeUtc,
    pub installed_by: i32,
}

impl ActiveModelBehavior for ActiveModel {}
