use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::completion::{apply_suggestion, PromptContext, SuggestionTarget};
use crate::errors::AppError;
use crate::routes::sessions::UpdateResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub target: SuggestionTarget,
    /// Free-form extra guidance appended to the prompt.
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub target: SuggestionTarget,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplySuggestionRequest {
    pub target: SuggestionTarget,
    pub text: String,
}

/// POST /api/v1/sessions/:id/suggestions
/// Generates text only; the document is not touched.
pub async fn handle_generate_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let context = state
        .sessions
        .read(id, |s| {
            PromptContext::build(&s.document, req.target, req.instructions.as_deref())
        })
        .await?;

    let text = state.completion.generate(&context).await.map_err(|e| {
        warn!(session = %id, target = ?req.target, error = %e, "suggestion failed");
        e
    })?;

    info!(session = %id, target = ?req.target, chars = text.len(), "suggestion generated");
    Ok(Json(SuggestionResponse {
        target: req.target,
        text,
    }))
}

/// POST /api/v1/sessions/:id/suggestions/apply
pub async fn handle_apply_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplySuggestionRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |session| {
            let mut document = session.document.clone();
            apply_suggestion(&mut document, req.target, &req.text)?;
            let update = session.replace_document(document);
            Ok(UpdateResponse {
                update,
                session: session.view(),
            })
        })
        .await?;
    Ok(Json(response))
}
