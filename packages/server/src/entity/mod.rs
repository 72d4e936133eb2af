pub mod api_usage_log;
pub mod integration;
pub mod integration_audit_log;
pub mod integration_credential;
pub mod integration_test_log;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_integration;
