//! Raster backend: tiles a captured bitmap of the scaled preview across as many
//! pages as it needs.
//!
//! The bitmap is scaled to the page width. Page `k` shows the band starting at
//! `k × pageHeight`; bands neither overlap nor leave gaps, and the unused tail of
//! the last page stays blank. One image object is shared by every page.

use bytes::Bytes;
use image::RgbaImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use tracing::debug;

use crate::layout::styles::PageSpec;
use crate::models::resume::ResumeDocument;
use crate::normalize::present;
use crate::render::{deflate, Artifact, ExportFormat, LayoutHints, RenderError, Renderer};

/// Unshown height below which no further page is emitted.
const BAND_TOLERANCE: f32 = 0.5;
/// Upper bound on tiled pages per capture.
pub const MAX_PAGES: usize = 10;
const IMAGE_NAME: Name<'static> = Name(b"Im0");

const FIRST_PAGE_ID: i32 = 5;

/// One page's slice of the image, in points from the image's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub page_index: usize,
    pub offset: f32,
}

/// Bands needed to show an image `image_height` points tall (already scaled to
/// the page width). Always at least one; more than `MAX_PAGES` is a
/// `CaptureFailure`.
pub fn plan_bands(image_height: f32, page: PageSpec) -> Result<Vec<Band>, RenderError> {
    let needed = ((image_height - BAND_TOLERANCE) / page.height).ceil().max(1.0);
    if !needed.is_finite() || needed > MAX_PAGES as f32 {
        return Err(RenderError::CaptureFailure(format!(
            "capture is {image_height:.0}pt tall once fitted to the page width; \
             at most {MAX_PAGES} pages are produced"
        )));
    }
    Ok((0..needed as usize)
        .map(|page_index| Band {
            page_index,
            offset: page_index as f32 * page.height,
        })
        .collect())
}

/// A decoded capture: opaque RGB pixels, row-major.
#[derive(Debug, Clone)]
pub struct Capture {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

impl Capture {
    /// Decodes PNG or JPEG bytes and flattens any alpha onto white.
    pub fn decode(data: &[u8]) -> Result<Self, RenderError> {
        if data.is_empty() {
            return Err(RenderError::CaptureFailure("capture is empty".to_string()));
        }
        let img = image::load_from_memory(data)
            .map_err(|e| RenderError::CaptureFailure(format!("could not decode capture: {e}")))?;
        let rgba = img.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(RenderError::CaptureFailure(format!(
                "capture has no area ({}x{})",
                rgba.width(),
                rgba.height()
            )));
        }
        Ok(Self::from_rgba(&rgba))
    }

    fn from_rgba(rgba: &RgbaImage) -> Self {
        let mut rgb = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
        for pixel in rgba.pixels() {
            let alpha = pixel[3] as u32;
            for channel in &pixel.0[..3] {
                let over_white = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(over_white as u8);
            }
        }
        Self {
            width_px: rgba.width(),
            height_px: rgba.height(),
            rgb,
        }
    }

    /// Height in points once the width is scaled to `page_width`.
    pub fn scaled_height(&self, page_width: f32) -> f32 {
        self.height_px as f32 * page_width / self.width_px as f32
    }
}

pub struct RasterRenderer {
    capture: Bytes,
}

impl RasterRenderer {
    pub fn new(capture: Bytes) -> Self {
        Self { capture }
    }
}

impl Renderer for RasterRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::RasterPdf
    }

    /// The capture is already scaled; only `hints.page` is read.
    fn render(&self, doc: &ResumeDocument, hints: &LayoutHints) -> Result<Artifact, RenderError> {
        let capture = Capture::decode(&self.capture)?;
        let bands = plan_bands(capture.scaled_height(hints.page.width), hints.page)?;
        let title = present(&doc.identity.name).unwrap_or("Resume");
        let bytes = encode_raster_pdf(&capture, &bands, hints.page, title);

        debug!(
            width_px = capture.width_px,
            height_px = capture.height_px,
            pages = bands.len(),
            "tiled capture"
        );

        Ok(Artifact {
            format: ExportFormat::RasterPdf,
            file_name: ExportFormat::RasterPdf.file_name(doc),
            bytes,
            page_count: Some(bands.len()),
        })
    }
}

pub fn encode_raster_pdf(capture: &Capture, bands: &[Band], page: PageSpec, title: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let image_height = capture.scaled_height(page.width);

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let image_id = Ref::new(3);
    let info_id = Ref::new(4);

    let page_ids: Vec<(Ref, Ref)> = bands
        .iter()
        .map(|band| {
            let base = FIRST_PAGE_ID + 2 * band.page_index as i32;
            (Ref::new(base), Ref::new(base + 1))
        })
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    let pixels = deflate(&capture.rgb);
    let mut image = pdf.image_xobject(image_id, &pixels);
    image.filter(Filter::FlateDecode);
    image.width(capture.width_px as i32);
    image.height(capture.height_px as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    for (band, (page_id, content_id)) in bands.iter().zip(&page_ids) {
        let mut page_writer = pdf.page(*page_id);
        page_writer.media_box(Rect::new(0.0, 0.0, page.width, page.height));
        page_writer.parent(page_tree_id);
        page_writer.contents(*content_id);
        page_writer.resources().x_objects().pair(IMAGE_NAME, image_id);
        page_writer.finish();

        // Image top sits `offset` above the page's top edge; the media box clips the rest.
        let bottom = page.height - image_height + band.offset;
        let mut content = Content::new();
        content.save_state();
        content.transform([page.width, 0.0, 0.0, image_height, 0.0, bottom]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(*content_id, &deflate(&content.finish()))
            .filter(Filter::FlateDecode);
    }

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("onepage-api ", env!("CARGO_PKG_VERSION"))));

    pdf.finish()
}
