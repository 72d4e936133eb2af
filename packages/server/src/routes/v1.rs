use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/integrations", integration_routes())
        .nest("/credentials", credential_routes())
        .nest("/usage", usage_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn integration_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::integration::list_integrations))
        // Literal segments take priority over the `{slug}` captures below.
        .routes(routes!(handlers::integration::compute_status))
        .routes(routes!(handlers::manage::manage_integration))
        .routes(routes!(handlers::integration::get_integration))
        .routes(routes!(handlers::integration::get_form_schema))
        .routes(routes!(handlers::audit::list_audit_log))
        .routes(routes!(handlers::audit::list_test_logs))
}

fn credential_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::credential::create_credential,
            handlers::credential::list_credentials
        ))
        .routes(routes!(handlers::credential::test_credential))
        .routes(routes!(handlers::credential::delete_credential))
}

fn usage_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::usage::record_usage))
        .routes(routes!(handlers::usage::usage_summary))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::list_users))
        .routes(routes!(handlers::admin::update_user_role))
}
