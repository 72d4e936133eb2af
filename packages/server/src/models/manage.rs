use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lifecycle action on an installed integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ManageAction {
    Install,
    Uninstall,
    Pause,
    Resume,
}

/// Request body for the multiplexed manage endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ManageIntegrationRequest {
    pub action: ManageAction,
    pub integration_id: i32,
    /// Required for `install`: the tested credential to activate.
    pub credential_id: Option<i32>,
    /// Free-form install configuration, stored verbatim.
    pub config: Option<serde_json::Value>,
}

pub fn validate_manage_request(req: &ManageIntegrationRequest) -> Result<(), AppError> {
    if req.action == ManageAction::Install && req.credential_id.is_none() {
        return Err(AppError::Validation(
            "credential_id is required for install".into(),
        ));
    }
    if req.action != ManageAction::Install && (req.credential_id.is_some() || req.config.is_some())
    {
        return Err(AppError::Validation(
            "credential_id and config are only accepted for install".into(),
        ));
    }
    Ok(())
}

/// An installed integration row.
#[derive(Serialize, utoipa::ToSchema)]
pub struct InstallationResponse {
    pub id: i32,
    pub integration_id: i32,
    pub credential_id: i32,
    /// One of: `active`, `paused`, `error`.
    #[schema(example = "active")]
    pub status: String,
    pub config: serde_json::Value,
    pub installed_at: DateTime<Utc>,
    pub installed_by: i32,
}

impl From<crate::entity::user_integration::Model> for InstallationResponse {
    fn from(m: crate::entity::user_integration::Model) -> Self {
        Self {
            id: m.id,
            integration_id: m.integration_id,
            credential_id: m.credential_id,
            status: m.status,
            config: m.config,
            installed_at: m.installed_at,
            installed_by: m.installed_by,
        }
    }
}
