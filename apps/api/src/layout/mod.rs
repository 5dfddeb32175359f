// Layout: static font metrics, the nominal style sheet, the auto-fit engine and
// page-fill reporting. The page composer itself lives in `render::page_tree`.

pub mod engine;
pub mod font_metrics;
pub mod page_fill;
pub mod styles;

use thiserror::Error;

pub use engine::{AutoFit, LayoutEvent, ScaleUpdate, Viewport};
pub use styles::{PageSpec, A4};

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Nothing measurable yet; callers skip the update rather than fail.
    #[error("measurement unavailable: {0}")]
    MeasurementUnavailable(String),
}
