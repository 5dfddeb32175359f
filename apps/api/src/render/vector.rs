//! Vector backend: encodes a composed `PageTree` as a one-page PDF.
//!
//! Text uses the standard-14 Helvetica faces (no embedding), so the widths in
//! `layout::font_metrics` are exactly what a viewer draws. Links become URI
//! annotations over the linked run.

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::debug;

use crate::layout::font_metrics::FontWeight;
use crate::models::resume::ResumeDocument;
use crate::normalize::present;
use crate::render::page_tree::{compose, PageNode, PageTree, TextNode};
use crate::render::{deflate, win_ansi, Artifact, ExportFormat, LayoutHints, RenderError, Renderer};

const PRODUCER: &str = concat!("onepage-api ", env!("CARGO_PKG_VERSION"));
/// Baseline position inside a glyph box, as a fraction of the font size.
const ASCENT: f32 = 0.8;

const FIRST_ANNOTATION_ID: i32 = 8;

pub struct VectorRenderer;

impl Renderer for VectorRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::VectorPdf
    }

    fn render(&self, doc: &ResumeDocument, hints: &LayoutHints) -> Result<Artifact, RenderError> {
        if !(hints.scale.is_finite() && hints.scale > 0.0 && hints.scale <= 1.0) {
            return Err(RenderError::EncodingFailure {
                format: ExportFormat::VectorPdf,
                message: format!("scale {} is outside (0, 1]", hints.scale),
            });
        }

        let tree = compose(doc, hints.scale, hints.page);
        if tree.overflows() {
            // The committed scale may trail the content by the commit tolerance.
            debug!(
                scale = hints.scale,
                content_bottom = tree.content_bottom,
                "vector page runs into the bottom padding"
            );
        }

        let title = present(&doc.identity.name).unwrap_or("Resume");
        let bytes = encode_pdf(&tree, title);

        Ok(Artifact {
            format: ExportFormat::VectorPdf,
            file_name: ExportFormat::VectorPdf.file_name(doc),
            bytes,
            page_count: Some(1),
        })
    }
}

/// Writes the tree as a single-page PDF.
pub fn encode_pdf(tree: &PageTree, title: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let page_height = tree.page.height;

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let regular_font_id = Ref::new(5);
    let bold_font_id = Ref::new(6);
    let info_id = Ref::new(7);

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let links: Vec<&TextNode> = tree.text_nodes().filter(|t| t.link.is_some()).collect();
    let annotation_ids: Vec<Ref> = (0..links.len() as i32)
        .map(|i| Ref::new(FIRST_ANNOTATION_ID + i))
        .collect();

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, tree.page.width, page_height));
    page.parent(page_tree_id);
    page.contents(content_id);
    if !annotation_ids.is_empty() {
        page.annotations(annotation_ids.iter().copied());
    }
    page.resources()
        .fonts()
        .pair(font_name(FontWeight::Regular), regular_font_id)
        .pair(font_name(FontWeight::Bold), bold_font_id);
    page.finish();

    for (id, weight) in [(regular_font_id, FontWeight::Regular), (bold_font_id, FontWeight::Bold)] {
        pdf.type1_font(id)
            .base_font(Name(weight.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (node, id) in links.iter().zip(&annotation_ids) {
        let Some(uri) = node.link.as_deref() else {
            continue;
        };
        let bottom = page_height - (node.top + node.line_advance);
        let mut annotation = pdf.annotation(*id);
        annotation
            .subtype(AnnotationType::Link)
            .rect(Rect::new(node.x, bottom, node.x + node.width, page_height - node.top));
        annotation.border(0.0, 0.0, 0.0, None);
        annotation
            .action()
            .action_type(ActionType::Uri)
            .uri(Str(uri.as_bytes()));
        annotation.finish();
    }

    let content = content_stream(tree);
    pdf.stream(content_id, &deflate(&content))
        .filter(Filter::FlateDecode);

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    pdf.finish()
}

/// Uncompressed page content: one text object per line, one stroke per rule.
pub(crate) fn content_stream(tree: &PageTree) -> Vec<u8> {
    let page_height = tree.page.height;
    let mut content = Content::new();

    for node in &tree.nodes {
        match node {
            PageNode::Text(text) => {
                let [r, g, b] = text.color.unit();
                let half_leading = (text.line_advance - text.size) / 2.0;
                let baseline = page_height - (text.top + half_leading + text.size * ASCENT);

                content.begin_text();
                content.set_font(font_name(text.weight), text.size);
                content.set_fill_rgb(r, g, b);
                content.set_char_spacing(text.char_spacing);
                content.set_text_matrix([1.0, 0.0, 0.0, 1.0, text.x, baseline]);
                content.show(Str(&win_ansi::encode(&text.text)));
                content.end_text();
            }
            PageNode::Rule(rule) => {
                let [r, g, b] = rule.color.unit();
                let y = page_height - (rule.top + rule.thickness / 2.0);
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(rule.thickness);
                content.move_to(rule.x, y);
                content.line_to(rule.x + rule.width, y);
                content.stroke();
            }
        }
    }

    content.finish()
}

fn font_name(weight: FontWeight) -> Name<'static> {
    match weight {
        FontWeight::Regular => Name(b"F1"),
        FontWeight::Bold => Name(b"F2"),
    }
}
