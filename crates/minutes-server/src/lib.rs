pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use extract_agent::ExtractClient;
use minutes_core::config::{Config, WarnLevel};
use minutes_core::store::CardStore;

use crate::auth::SessionMap;
use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sessions = app_state.sessions.clone();

    Router::new()
        // Action items
        .route(
            "/action-items",
            get(routes::action_items::list).post(routes::action_items::create),
        )
        .route("/action-items/bulk", post(routes::action_items::bulk_create))
        .route(
            "/action-items/{id}",
            get(routes::action_items::get_one)
                .put(routes::action_items::update)
                .patch(routes::action_items::update)
                .delete(routes::action_items::delete),
        )
        .route(
            "/action-items/{id}/status",
            patch(routes::action_items::patch_status),
        )
        .route(
            "/action-items/{id}/position",
            patch(routes::action_items::patch_position),
        )
        .route(
            "/action-items/{id}/move",
            patch(routes::action_items::patch_move),
        )
        // Meeting notes (narrow contract) + extraction
        .route("/meeting-notes", post(routes::notes::create_note))
        .route(
            "/meeting-notes/{id}",
            get(routes::notes::get_note).delete(routes::notes::delete_note),
        )
        .route("/meeting-notes/{id}/extract", post(routes::notes::extract))
        .layer(middleware::from_fn_with_state(sessions, auth::auth_middleware))
        .layer(cors)
        .with_state(app_state)
}

/// Start the board API server from a loaded config.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => anyhow::bail!("config error: {}", warning.message),
            WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
        }
    }

    let store = CardStore::open(&config.data_path)?;
    let sessions = SessionMap::from_entries(
        config
            .sessions
            .iter()
            .map(|s| (s.token.clone(), s.user.clone())),
    );
    if sessions.is_empty() {
        let token = sessions.mint("local");
        tracing::info!("no sessions configured; minted token for user 'local': {token}");
    }

    let api_key = config
        .extractor
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok());
    let extractor = ExtractClient::new(
        &config.extractor.base_url,
        Duration::from_secs(config.extractor.timeout_secs),
        api_key,
    )?;

    let app = build_router(AppState {
        store: Arc::new(store),
        sessions: Arc::new(sessions),
        extractor,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("minutes API listening on http://localhost:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
