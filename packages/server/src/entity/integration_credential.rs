use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of the most recent probe, stored on the credential row.
pub const TEST_STATUS_UNTESTED: &str = "untested";
pub const TEST_STATUS_SUCCESS: &str = "success";
pub const TEST_STATUS_FAILED: &str = "failed";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_credential")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub integration_id: i32,
    #[sea_orm(belongs_to, from = "integration_id", to = "id")]
    pub integration: HasOne<super::integration::Entity>,

    /// Secret field map, AES-256-GCM encrypted (compact `1:<nonce>:<ct>` form).
    #[sea_orm(column_type = "Text")]
    pub secrets: String,

    /// NULL until the credential has been probed at least once.
    pub last_tested_at: Option<DateTimeUtc>,
    /// One of: `untested`, `success`, `failed`.
    pub last_test_status: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub last_test_error: Option<serde_json::Value>,

    pub expires_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
