use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::shared::Pagination;

/// One append-only audit entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuditLogResponse {
    pub id: i32,
    pub user_id: i32,
    pub integration_id: i32,
    #[schema(example = "installed")]
    pub action: String,
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::integration_audit_log::Model> for AuditLogResponse {
    fn from(m: crate::entity::integration_audit_log::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            integration_id: m.integration_id,
            action: m.action,
            detail: m.detail,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuditLogListResponse {
    pub data: Vec<AuditLogResponse>,
    pub pagination: Pagination,
}

/// One probe invocation record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestLogResponse {
    pub id: i32,
    pub credential_id: i32,
    pub integration_id: i32,
    pub success: bool,
    pub latency_ms: i64,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::integration_test_log::Model> for TestLogResponse {
    fn from(m: crate::entity::integration_test_log::Model) -> Self {
        Self {
            id: m.id,
            credential_id: m.credential_id,
            integration_id: m.integration_id,
            success: m.success,
            latency_ms: m.latency_ms,
            error: m.error,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TestLogListResponse {
    pub data: Vec<TestLogResponse>,
    pub pagination: Pagination,
}
