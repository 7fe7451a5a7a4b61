//! HTTP routes.

mod discover;
mod format;
mod generate;
mod info;
mod lint;
pub mod types;
mod validate;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the API router over `state`.
pub fn router(state: AppState) -> Router {
    let body_limit = state.limits.body_limit;

    let guardz = Router::new()
        .route("/generate-type-guards", post(generate::generate_type_guards))
        .route("/discover-files", post(discover::discover_files))
        .route("/validate-typescript", post(validate::validate_typescript))
        .route("/format-code", post(format::format_code))
        .route("/lint-code", post(lint::lint_code))
        .route("/project-info", get(info::project_info));

    Router::new()
        .nest("/api/guardz", guardz)
        .route("/api/health", get(info::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
