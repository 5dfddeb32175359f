//! Export orchestration.
//!
//! At most one export per format is in flight per session. A request that finds
//! its format busy is rejected, not queued. Rendering is CPU-bound and runs inside
//! `tokio::task::spawn_blocking`; the permit travels with the blocking task, so
//! the flag clears when rendering ends even if the caller has gone away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::render::{Artifact, ExportFormat, LayoutHints, Renderer};

#[derive(Debug, Clone, Default)]
pub struct ExportGuard {
    vector_pdf: Arc<AtomicBool>,
    docx: Arc<AtomicBool>,
    raster_pdf: Arc<AtomicBool>,
}

impl ExportGuard {
    fn flag(&self, format: ExportFormat) -> &Arc<AtomicBool> {
        match format {
            ExportFormat::VectorPdf => &self.vector_pdf,
            ExportFormat::Docx => &self.docx,
            ExportFormat::RasterPdf => &self.raster_pdf,
        }
    }

    /// Claims the format's slot. `None` if an export of that format is running.
    pub fn try_begin(&self, format: ExportFormat) -> Option<ExportPermit> {
        let flag = self.flag(format);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(ExportPermit {
            flag: Arc::clone(flag),
        })
    }

    pub fn in_flight(&self, format: ExportFormat) -> bool {
        self.flag(format).load(Ordering::Acquire)
    }
}

/// Held for the duration of one export; releases the slot on drop.
#[derive(Debug)]
pub struct ExportPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Renders `doc` with `renderer` unless an export of the same format is already
/// running. `doc` and `hints` are snapshots; the session is never touched.
pub async fn run_export(
    guard: &ExportGuard,
    renderer: Box<dyn Renderer>,
    doc: ResumeDocument,
    hints: LayoutHints,
) -> Result<Artifact, AppError> {
    let format = renderer.format();
    let permit = guard
        .try_begin(format)
        .ok_or(AppError::ExportInFlight(format))?;

    let result = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        renderer.render(&doc, &hints)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {format:?} export: {e}")))?;

    match result {
        Ok(artifact) => {
            info!(
                ?format,
                file_name = %artifact.file_name,
                bytes = artifact.bytes.len(),
                pages = ?artifact.page_count,
                scale = hints.scale,
                "export finished"
            );
            Ok(artifact)
        }
        Err(e) => {
            warn!(?format, error = %e, "export failed");
            Err(e.into())
        }
    }
}
