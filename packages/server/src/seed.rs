use sea_orm::*;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{api_usage_log, integration, role, role_permission};
use crate::probes::{SLUG_ANTHROPIC, SLUG_DEEPGRAM, SLUG_GEMINI, SLUG_OPENAI};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "member"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "credential:manage"),
    ("admin", "integration:install"),
    ("admin", "usage:record"),
    ("admin", "usage:view"),
    ("admin", "audit:view_all"),
    ("admin", "user:manage"),
    // Member
    ("member", "credential:manage"),
    ("member", "integration:install"),
    ("member", "usage:record"),
    ("member", "usage:view"),
];

/// Provider catalog seeded on startup: (slug, name, category).
const DEFAULT_INTEGRATIONS: &[(&str, &str, &str)] = &[
    (SLUG_OPENAI, "OpenAI", "llm"),
    (SLUG_ANTHROPIC, "Anthropic", "llm"),
    (SLUG_DEEPGRAM, "Deepgram", "transcription"),
    (SLUG_GEMINI, "Google Gemini", "llm"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Seed the provider catalog. Rows are read-only at runtime.
pub async fn seed_integrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &(slug, name, category) in DEFAULT_INTEGRATIONS {
        let model = integration::ActiveModel {
            slug: Set(slug.to_string()),
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            auth_type: Set("api_key".to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let result = integration::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(integration::Column::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new catalog integrations", inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for the status resolver's usage window:
    // SELECT SUM(...) FROM api_usage_log
    //   WHERE user_id = ? AND integration_id = ? AND created_at >= ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_usage_user_integration_created")
        .table(api_usage_log::Entity)
        .col(api_usage_log::Column::UserId)
        .col(api_usage_log::Column::IntegrationId)
        .col(api_usage_log::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_usage_user_integration_created exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_usage_user_integration_created: {}",
                e
            );
        }
    }

    Ok(())
}
