pub mod exports;
pub mod health;
pub mod sessions;
pub mod suggestions;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Editing sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/document",
            put(sessions::handle_replace_document).patch(sessions::handle_edit_document),
        )
        .route(
            "/api/v1/sessions/:id/viewport",
            put(sessions::handle_resize_viewport),
        )
        .route("/api/v1/sessions/:id/preview", get(sessions::handle_preview))
        // Exports
        .route(
            "/api/v1/sessions/:id/export/pdf",
            post(exports::handle_export_pdf),
        )
        .route(
            "/api/v1/sessions/:id/export/docx",
            post(exports::handle_export_docx),
        )
        .route(
            "/api/v1/sessions/:id/export/raster",
            post(exports::handle_export_raster),
        )
        // Suggestions
        .route(
            "/api/v1/sessions/:id/suggestions",
            post(suggestions::handle_generate_suggestion),
        )
        .route(
            "/api/v1/sessions/:id/suggestions/apply",
            post(suggestions::handle_apply_suggestion),
        )
        .with_state(state)
}
