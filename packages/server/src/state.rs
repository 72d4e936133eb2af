use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Shared outbound HTTP client used by the credential probes.
    pub http: reqwest::Client,
}
