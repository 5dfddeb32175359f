//! Renderers: three backends behind one `Renderer` capability.
//!
//! Each backend owns its layout policy (positioned single page, flow blocks,
//! tiled bitmap) and reads the document through `crate::normalize`. Renderers
//! are stateless: they borrow the document for one call and keep nothing.

pub mod flow;
pub mod page_tree;
pub mod raster;
pub mod sections;
pub mod vector;
mod win_ansi;

use serde::Serialize;
use thiserror::Error;

use crate::layout::styles::PageSpec;
use crate::models::resume::ResumeDocument;
use crate::normalize::file_stem;

pub use flow::FlowRenderer;
pub use raster::RasterRenderer;
pub use vector::VectorRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("capture failed: {0}")]
    CaptureFailure(String),

    #[error("{format:?} encoding failed: {message}")]
    EncodingFailure {
        format: ExportFormat,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    VectorPdf,
    Docx,
    RasterPdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::VectorPdf | ExportFormat::RasterPdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    fn file_suffix(&self) -> &'static str {
        match self {
            ExportFormat::VectorPdf => "_Resume.pdf",
            ExportFormat::Docx => "_Resume.docx",
            ExportFormat::RasterPdf => "_Resume_Image.pdf",
        }
    }

    /// Download name derived from the document's identity.
    pub fn file_name(&self, doc: &ResumeDocument) -> String {
        format!("{}{}", file_stem(&doc.identity), self.file_suffix())
    }
}

/// Layout state read at export time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutHints {
    /// The committed auto-fit scale the preview last showed.
    pub scale: f32,
    pub page: PageSpec,
}

/// A finished export, ready to hand to the user as a file.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Pages in the artifact; `None` for flow documents, which paginate on open.
    pub page_count: Option<usize>,
}

/// `(Document, LayoutHints) -> Artifact`.
pub trait Renderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, doc: &ResumeDocument, hints: &LayoutHints) -> Result<Artifact, RenderError>;
}

/// Compresses a PDF stream body for `/FlateDecode`.
pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}
