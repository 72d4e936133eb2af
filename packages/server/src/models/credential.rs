use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::form_schema::FormField;

/// Request body for saving a credential. Secret values are encrypted at
/// rest and never returned by any endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCredentialRequest {
    pub integration_id: i32,
    /// Secret field map keyed by the form schema's field names.
    #[schema(example = json!({"api_key": "sk-..."}))]
    pub secrets: HashMap<String, String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Validate a submitted secret map against the integration's form schema:
/// every required field present and non-empty, no fields outside the schema.
pub fn validate_secrets(
    secrets: &HashMap<String, String>,
    schema: &[FormField],
) -> Result<(), AppError> {
    for field in schema {
        if field.required
            && !secrets
                .get(field.name)
                .is_some_and(|v| !v.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "Field '{}' is required",
                field.name
            )));
        }
    }

    for name in secrets.keys() {
        if !schema.iter().any(|f| f.name == name) {
            return Err(AppError::Validation(format!(
                "Unknown credential field '{name}'"
            )));
        }
    }

    Ok(())
}

/// A stored credential. Secrets are reduced to their field names.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CredentialResponse {
    pub id: i32,
    pub integration_id: i32,
    /// Names of the secret fields stored on this credential.
    #[schema(example = json!(["api_key"]))]
    pub field_names: Vec<String>,
    pub last_tested_at: Option<DateTime<Utc>>,
    /// One of: `untested`, `success`, `failed`.
    #[schema(example = "untested")]
    pub last_test_status: String,
    pub last_test_error: Option<serde_json::Value>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialResponse {
    /// Build from an entity row plus the decrypted field names.
    pub fn from_model(
        m: crate::entity::integration_credential::Model,
        mut field_names: Vec<String>,
    ) -> Self {
        field_names.sort();
        Self {
            id: m.id,
            integration_id: m.integration_id,
            field_names,
            last_tested_at: m.last_tested_at,
            last_test_status: m.last_test_status,
            last_test_error: m.last_test_error,
            expires_at: m.expires_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Query parameters for listing credentials.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CredentialListQuery {
    /// Restrict to one integration.
    pub integration_id: Option<i32>,
}

/// Request body for the credential tester.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TestCredentialRequest {
    pub credential_id: i32,
}

/// Outcome of a probe run. A failed probe is still a successful test
/// invocation; `success` reports what the provider said.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestCredentialResponse {
    pub success: bool,
    /// New `last_test_status` of the credential: `success` or `failed`.
    #[schema(example = "success")]
    pub status: String,
    pub latency_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}
