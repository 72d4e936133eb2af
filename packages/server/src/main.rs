use tracing::{Level, info};

use switchboard_server::config::AppConfig;
use switchboard_server::state::AppState;
use switchboard_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::seed_role_permissions(&db).await?;
    seed::seed_integrations(&db).await?;
    seed::ensure_indexes(&db).await?;

    let state = AppState {
        db,
        http: reqwest::Client::new(),
        config: config.clone(),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
