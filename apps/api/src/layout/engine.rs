//! Auto-Fit Layout Engine: keeps one committed scale per document state.
//!
//! # Model
//! - `compute_scale` is the pure core: `min(1, available / content)`.
//! - `AutoFit` owns the committed scale and re-measures from scratch on every
//!   `LayoutEvent` (content changed, viewport resized). Nothing is cached
//!   between measurements.
//! - A candidate scale is committed only if it moves by more than
//!   `SCALE_TOLERANCE`; smaller moves are re-measurement noise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::styles::{PageSpec, NOMINAL};
use crate::layout::LayoutError;
use crate::models::resume::ResumeDocument;
use crate::render::page_tree::compose;

/// Minimum change (in absolute scale units) that replaces the committed scale.
pub const SCALE_TOLERANCE: f32 = 0.01;

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// What the displaying surface reports about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Height of the preview sheet in points; `None` means the full page.
    pub sheet_height: Option<f32>,
}

/// A fresh measurement of natural (unscaled) content against the usable height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub content_height: f32,
    pub available_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutEvent {
    ContentChanged,
    ViewportResized(Viewport),
}

/// Result of feeding one event or measurement to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScaleUpdate {
    Committed { previous: f32, scale: f32 },
    /// The candidate was within tolerance; the committed scale stands.
    Retained { committed: f32, candidate: f32 },
    /// No usable measurement; nothing changed.
    Skipped { reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Pure functions
// ────────────────────────────────────────────────────────────────────────────

/// Largest uniform scale in (0, 1] that fits `content_height` into
/// `available_height`. `None` when either input is non-positive or not finite.
pub fn compute_scale(content_height: f32, available_height: f32) -> Option<f32> {
    let usable = content_height.is_finite()
        && available_height.is_finite()
        && content_height > 0.0
        && available_height > 0.0;
    if !usable {
        return None;
    }
    Some((available_height / content_height).min(1.0))
}

/// Usable content height: the sheet (never taller than the page) minus the
/// nominal top and bottom padding.
pub fn available_height(page: PageSpec, viewport: Viewport) -> f32 {
    let sheet = viewport
        .sheet_height
        .unwrap_or(page.height)
        .min(page.height);
    sheet - NOMINAL.vertical_padding()
}

/// Composes the document at scale 1 and measures it.
pub fn measure(
    doc: &ResumeDocument,
    page: PageSpec,
    viewport: Viewport,
) -> Result<Measurement, LayoutError> {
    let available = available_height(page, viewport);
    if !(available.is_finite() && available > 0.0) {
        return Err(LayoutError::MeasurementUnavailable(format!(
            "viewport leaves no room for content (available height {available:.1}pt)"
        )));
    }

    let content = compose(doc, 1.0, page).content_height();
    if !(content.is_finite() && content > 0.0) {
        return Err(LayoutError::MeasurementUnavailable(
            "no measurable content".to_string(),
        ));
    }

    Ok(Measurement {
        content_height: content,
        available_height: available,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Engine state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AutoFit {
    committed: f32,
    viewport: Viewport,
    last_measurement: Option<Measurement>,
}

impl Default for AutoFit {
    fn default() -> Self {
        Self {
            committed: 1.0,
            viewport: Viewport::default(),
            last_measurement: None,
        }
    }
}

impl AutoFit {
    /// The scale the preview shows and the vector export uses.
    pub fn committed(&self) -> f32 {
        self.committed
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_measurement(&self) -> Option<Measurement> {
        self.last_measurement
    }

    /// Feeds one measurement. Commits the candidate scale only when it differs
    /// from the committed one by more than `SCALE_TOLERANCE`.
    pub fn observe(&mut self, measurement: Measurement) -> ScaleUpdate {
        let Some(candidate) =
            compute_scale(measurement.content_height, measurement.available_height)
        else {
            return ScaleUpdate::Skipped {
                reason: "measurement is not usable".to_string(),
            };
        };
        self.last_measurement = Some(measurement);

        if (candidate - self.committed).abs() > SCALE_TOLERANCE {
            let previous = self.committed;
            self.committed = candidate;
            ScaleUpdate::Committed {
                previous,
                scale: candidate,
            }
        } else {
            ScaleUpdate::Retained {
                committed: self.committed,
                candidate,
            }
        }
    }

    /// Handles a content or viewport change by measuring `doc` from scratch.
    pub fn handle(&mut self, event: LayoutEvent, doc: &ResumeDocument, page: PageSpec) -> ScaleUpdate {
        if let LayoutEvent::ViewportResized(viewport) = event {
            self.viewport = viewport;
        }

        match measure(doc, page, self.viewport) {
            Ok(measurement) => {
                let update = self.observe(measurement);
                debug!(?event, ?update, "auto-fit re-measured");
                update
            }
            Err(e) => {
                debug!(?event, error = %e, "auto-fit skipped");
                ScaleUpdate::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }
}
