//! Page Fill Analysis: how the committed scale relates to the last measurement.
//!
//! The committed scale can lag the content by up to the commit tolerance, so a
//! page that was shrunk may still run slightly long. This report makes that
//! visible next to the "Auto-fit: NN%" label.

use serde::{Deserialize, Serialize};

use crate::layout::engine::Measurement;

/// Slack in points before a scaled layout counts as overflowing.
const OVERFLOW_SLACK: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitVerdict {
    /// Content fits at full size.
    FitsNaturally,
    /// Content was shrunk and now fits.
    Shrunk,
    /// Scaled content is taller than the usable height (committed scale lags).
    Overflowing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub natural_height: f32,
    pub available_height: f32,
    pub scale: f32,
    /// Upper bound of the scaled content height (`scale × natural_height`).
    pub scaled_height: f32,
    /// `scaled_height / available_height`.
    pub fill_fraction: f32,
    pub verdict: FitVerdict,
    pub label: String,
}

/// Analyzes a measurement against the scale actually committed.
pub fn analyze_fit(measurement: &Measurement, committed_scale: f32) -> FitReport {
    let scaled_height = measurement.content_height * committed_scale;
    let fill_fraction = scaled_height / measurement.available_height;

    let verdict = if scaled_height > measurement.available_height + OVERFLOW_SLACK {
        FitVerdict::Overflowing
    } else if committed_scale >= 1.0 {
        FitVerdict::FitsNaturally
    } else {
        FitVerdict::Shrunk
    };

    FitReport {
        natural_height: measurement.content_height,
        available_height: measurement.available_height,
        scale: committed_scale,
        scaled_height,
        fill_fraction,
        verdict,
        label: scale_label(committed_scale),
    }
}

/// "Auto-fit: 87%".
pub fn scale_label(scale: f32) -> String {
    format!("Auto-fit: {:.0}%", scale * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(content: f32, available: f32) -> Measurement {
        Measurement {
            content_height: content,
            available_height: available,
        }
    }

    #[test]
    fn test_fits_naturally() {
        let report = analyze_fit(&m(600.0, 800.0), 1.0);
        assert_eq!(report.verdict, FitVerdict::FitsNaturally);
        assert!((report.fill_fraction - 0.75).abs() < 1e-6);
        assert_eq!(report.label, "Auto-fit: 100%");
    }

    #[test]
    fn test_shrunk() {
        let report = analyze_fit(&m(1000.0, 800.0), 0.8);
        assert_eq!(report.verdict, FitVerdict::Shrunk);
        assert_eq!(report.label, "Auto-fit: 80%");
    }

    #[test]
    fn test_lagging_scale_reports_overflow() {
        // Content grew 0.5% since 0.8 was committed; the engine kept 0.8.
        let report = analyze_fit(&m(1005.0, 800.0), 0.8);
        assert_eq!(report.verdict, FitVerdict::Overflowing);
        assert!(report.fill_fraction > 1.0);
    }
}
