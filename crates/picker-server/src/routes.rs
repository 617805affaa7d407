use crate::state::AppState;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect};
use axum::routing::{get, post};
use axum::Router;
use picker_core::catalog::Catalog;
use picker_core::chat;
use picker_core::render;
use serde::Deserialize;
use tracing::{debug, error};

type HandlerError = (StatusCode, String);

fn storage_error(e: picker_core::PickerError) -> HandlerError {
    error!("Failed to persist selection: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Page ────────────────────────────────────────────────────────────────

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(page))
}

async fn page(State(state): State<AppState>) -> Html<String> {
    let session = state.session.read().await;
    Html(render::render_page(&session))
}

// ── Catalog ─────────────────────────────────────────────────────────────

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/catalog/filter", post(filter_catalog))
}

#[derive(Debug, Deserialize)]
struct FilterForm {
    category: String,
}

/// Category change: re-fetch the data file, then show that category.
async fn filter_catalog(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Redirect, HandlerError> {
    let products = state.catalog_source.load().await.map_err(|e| {
        error!(
            "Failed to load catalog from {}: {}",
            state.catalog_source.location(),
            e
        );
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let mut session = state.session.write().await;
    session.apply_filter(&form.category, Catalog::new(products));
    Ok(Redirect::to("/"))
}

// ── Selection ───────────────────────────────────────────────────────────

pub fn selection_routes() -> Router<AppState> {
    Router::new()
        .route("/selection/toggle", post(toggle_product))
        .route("/selection/remove", post(remove_product))
        .route("/selection/clear", post(clear_selection))
        .route("/api/selection", get(list_selection))
}

#[derive(Debug, Deserialize)]
struct ProductForm {
    name: String,
}

async fn toggle_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, HandlerError> {
    let mut session = state.session.write().await;
    session.toggle(&form.name).map_err(storage_error)?;
    Ok(Redirect::to("/"))
}

async fn remove_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, HandlerError> {
    let mut session = state.session.write().await;
    session.remove(&form.name).map_err(storage_error)?;
    Ok(Redirect::to("/"))
}

async fn clear_selection(State(state): State<AppState>) -> Result<Redirect, HandlerError> {
    let mut session = state.session.write().await;
    session.clear().map_err(storage_error)?;
    Ok(Redirect::to("/"))
}

async fn list_selection(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.selection().names().to_vec())
}

// ── Chat ────────────────────────────────────────────────────────────────

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(submit_chat))
        .route("/routine", post(generate_routine))
}

#[derive(Debug, Deserialize)]
struct ChatForm {
    #[serde(default)]
    message: String,
}

async fn submit_chat(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Redirect {
    let outcome = chat::submit_chat(&state.session, state.assistant.as_ref(), &form.message).await;
    debug!("Chat turn finished: {:?}", outcome);
    Redirect::to("/")
}

async fn generate_routine(State(state): State<AppState>) -> Result<Redirect, HandlerError> {
    let outcome = chat::generate_routine(&state.session, state.assistant.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to build routine request: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    debug!("Routine turn finished: {:?}", outcome);
    Ok(Redirect::to("/"))
}
