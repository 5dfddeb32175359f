use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::run_export;
use crate::render::{Artifact, FlowRenderer, RasterRenderer, RenderError, Renderer, VectorRenderer};
use crate::state::AppState;

/// Multipart field carrying the raster capture.
const CAPTURE_FIELD: &str = "capture";

/// POST /api/v1/sessions/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    export(&state, id, Box::new(VectorRenderer)).await
}

/// POST /api/v1/sessions/:id/export/docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    export(&state, id, Box::new(FlowRenderer)).await
}

/// POST /api/v1/sessions/:id/export/raster
/// Expects the displayed preview as a PNG or JPEG in the `capture` field.
pub async fn handle_export_raster(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut capture: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some(CAPTURE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read capture: {e}")))?;
            capture = Some(data);
        }
    }

    let capture = capture.ok_or_else(|| {
        RenderError::CaptureFailure(format!("no `{CAPTURE_FIELD}` field in the upload"))
    })?;
    export(&state, id, Box::new(RasterRenderer::new(capture))).await
}

/// Snapshots the session, releases the lock, then renders.
async fn export(state: &AppState, id: Uuid, renderer: Box<dyn Renderer>) -> Result<Response, AppError> {
    let (document, hints, guard) = state
        .sessions
        .read(id, |s| (s.document.clone(), s.layout_hints(), s.exports.clone()))
        .await?;

    let artifact = run_export(&guard, renderer, document, hints).await?;
    Ok(artifact_response(artifact))
}

fn artifact_response(artifact: Artifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    let mut response = (
        [
            (header::CONTENT_TYPE, artifact.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response();

    if let Some(pages) = artifact.page_count {
        response.headers_mut().insert("x-page-count", pages.into());
    }
    response
}
