use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::page_fill::FitReport;
use crate::layout::{ScaleUpdate, Viewport};
use crate::models::edit::ResumeEdit;
use crate::models::resume::ResumeDocument;
use crate::render::page_tree::{compose, PageTree};
use crate::session::{Session, SessionView};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Starting content; the sample résumé when absent.
    pub document: Option<ResumeDocument>,
}

/// What a mutation did to the layout, plus the resulting session.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub update: ScaleUpdate,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub tree: PageTree,
    pub fit: FitReport,
}

/// POST /api/v1/sessions
/// An empty body starts from the sample résumé; a body that is present must parse.
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let req: CreateSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid session request: {e}")))?
    };
    let document = req.document.unwrap_or_else(ResumeDocument::sample);
    let session = Session::new(document, state.page);
    let view = session.view();
    state.sessions.insert(session).await;

    info!(session = %view.id, scale = view.scale, "session created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state.sessions.read(id, Session::view).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!(session = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/document
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |session| {
            let update = session.replace_document(document);
            Ok(UpdateResponse {
                update,
                session: session.view(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// PATCH /api/v1/sessions/:id/document
pub async fn handle_edit_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<ResumeEdit>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |session| {
            let update = session.apply_edit(edit)?;
            Ok(UpdateResponse {
                update,
                session: session.view(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// PUT /api/v1/sessions/:id/viewport
pub async fn handle_resize_viewport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(viewport): Json<Viewport>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |session| {
            let update = session.resize(viewport);
            Ok(UpdateResponse {
                update,
                session: session.view(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/sessions/:id/preview
/// The page tree at the committed scale.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let (document, hints, fit) = state
        .sessions
        .read(id, |s| (s.document.clone(), s.layout_hints(), s.fit_report()))
        .await?;
    let fit = fit?;

    let tree = tokio::task::spawn_blocking(move || compose(&document, hints.scale, hints.page))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in preview: {e}")))?;

    Ok(Json(PreviewResponse { tree, fit }))
}
