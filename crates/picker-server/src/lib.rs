pub mod routes;
pub mod state;

use axum::Router;
use picker_core::config::AppConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .merge(routes::page_routes())
        .merge(routes::catalog_routes())
        .merge(routes::selection_routes())
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config.clone()).await?;
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
