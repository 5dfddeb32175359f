//! The fixed page and the nominal style sheet every vector dimension is derived from.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontWeight;

// ────────────────────────────────────────────────────────────────────────────
// Page
// ────────────────────────────────────────────────────────────────────────────

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
}

/// ISO A4 portrait.
pub const A4: PageSpec = PageSpec {
    width: 595.28,
    height: 841.89,
};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// Components in 0.0..=1.0, as PDF colour operators expect.
    pub fn unit(&self) -> [f32; 3] {
        [self.0, self.1, self.2].map(|c| c as f32 / 255.0)
    }
}

pub const INK: Rgb = Rgb::hex(0x0f172a);
pub const HEADING: Rgb = Rgb::hex(0x1e293b);
pub const MUTED: Rgb = Rgb::hex(0x475569);
pub const SUBTLE: Rgb = Rgb::hex(0x64748b);
pub const LINK: Rgb = Rgb::hex(0x2563eb);
pub const RULE: Rgb = Rgb::hex(0xe2e8f0);

// ────────────────────────────────────────────────────────────────────────────
// Style sheet
// ────────────────────────────────────────────────────────────────────────────

/// Font size, weight, colour and line height of one kind of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: Rgb,
    /// Multiple of `size`.
    pub line_height: f32,
    pub char_spacing: f32,
}

impl TextStyle {
    const fn new(size: f32, weight: FontWeight, color: Rgb) -> Self {
        Self {
            size,
            weight,
            color,
            line_height: 1.2,
            char_spacing: 0.0,
        }
    }

    pub fn line_advance(&self) -> f32 {
        self.size * self.line_height
    }

    fn scaled(self, s: f32) -> Self {
        Self {
            size: self.size * s,
            char_spacing: self.char_spacing * s,
            ..self
        }
    }
}

/// Every linear dimension of the resume layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Styles {
    pub padding_top: f32,
    pub padding_bottom: f32,
    pub padding_x: f32,

    pub name: TextStyle,
    pub name_gap: f32,
    pub headline: TextStyle,
    pub headline_gap: f32,
    pub contact: TextStyle,
    pub header_padding_bottom: f32,
    pub header_rule: f32,
    pub header_gap: f32,

    pub section_gap: f32,
    pub section_title: TextStyle,
    pub section_title_gap: f32,
    pub paragraph: TextStyle,

    pub row_gap: f32,
    pub entry_title: TextStyle,
    pub entry_subtitle: TextStyle,
    pub entry_subtitle_top: f32,
    pub entry_aside: TextStyle,
    pub role_gap: f32,

    pub list_top: f32,
    pub list_indent: f32,
    pub list_item: TextStyle,
    pub list_item_gap: f32,

    pub project_title: TextStyle,
    pub project_title_gap: f32,
    pub project_link: TextStyle,
    pub education_gap: f32,
}

/// The unscaled style sheet.
pub const NOMINAL: Styles = Styles {
    padding_top: 26.0,
    padding_bottom: 24.0,
    padding_x: 34.0,

    name: TextStyle::new(20.0, FontWeight::Bold, INK),
    name_gap: 4.0,
    headline: TextStyle::new(11.0, FontWeight::Bold, HEADING),
    headline_gap: 4.0,
    contact: TextStyle::new(9.0, FontWeight::Regular, MUTED),
    header_padding_bottom: 8.0,
    header_rule: 2.0,
    header_gap: 10.0,

    section_gap: 8.0,
    section_title: TextStyle {
        char_spacing: 0.5,
        ..TextStyle::new(10.0, FontWeight::Bold, HEADING)
    },
    section_title_gap: 4.0,
    paragraph: TextStyle {
        line_height: 1.4,
        ..TextStyle::new(9.0, FontWeight::Regular, INK)
    },

    row_gap: 4.0,
    entry_title: TextStyle::new(9.0, FontWeight::Regular, INK),
    entry_subtitle: TextStyle::new(8.5, FontWeight::Regular, SUBTLE),
    entry_subtitle_top: 2.0,
    entry_aside: TextStyle::new(8.5, FontWeight::Bold, MUTED),
    role_gap: 2.0,

    list_top: 1.0,
    list_indent: 10.0,
    list_item: TextStyle {
        line_height: 1.3,
        ..TextStyle::new(8.5, FontWeight::Regular, INK)
    },
    list_item_gap: 0.5,

    project_title: TextStyle::new(9.0, FontWeight::Bold, INK),
    project_title_gap: 1.0,
    project_link: TextStyle::new(8.5, FontWeight::Regular, LINK),
    education_gap: 5.0,
};

impl Styles {
    /// Total nominal vertical page padding; subtracted from the sheet height to get
    /// the height content may occupy.
    pub fn vertical_padding(&self) -> f32 {
        self.padding_top + self.padding_bottom
    }

    /// The style sheet with every linear dimension multiplied by `s`.
    /// Line-height multipliers are ratios and stay as they are.
    pub fn scaled(&self, s: f32) -> Styles {
        Styles {
            padding_top: self.padding_top * s,
            padding_bottom: self.padding_bottom * s,
            padding_x: self.padding_x * s,
            name: self.name.scaled(s),
            name_gap: self.name_gap * s,
            headline: self.headline.scaled(s),
            headline_gap: self.headline_gap * s,
            contact: self.contact.scaled(s),
            header_padding_bottom: self.header_padding_bottom * s,
            header_rule: self.header_rule * s,
            header_gap: self.header_gap * s,
            section_gap: self.section_gap * s,
            section_title: self.section_title.scaled(s),
            section_title_gap: self.section_title_gap * s,
            paragraph: self.paragraph.scaled(s),
            row_gap: self.row_gap * s,
            entry_title: self.entry_title.scaled(s),
            entry_subtitle: self.entry_subtitle.scaled(s),
            entry_subtitle_top: self.entry_subtitle_top * s,
            entry_aside: self.entry_aside.scaled(s),
            role_gap: self.role_gap * s,
            list_top: self.list_top * s,
            list_indent: self.list_indent * s,
            list_item: self.list_item.scaled(s),
            list_item_gap: self.list_item_gap * s,
            project_title: self.project_title.scaled(s),
            project_title_gap: self.project_title_gap * s,
            project_link: self.project_link.scaled(s),
            education_gap: self.education_gap * s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colour() {
        let c = Rgb::hex(0xff0080);
        assert_eq!(c, Rgb(255, 0, 128));
        let [r, g, b] = c.unit();
        assert!((r - 1.0).abs() < 1e-6);
        assert!(g.abs() < 1e-6);
        assert!((b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_scaled_multiplies_linear_dimensions_only() {
        let half = NOMINAL.scaled(0.5);
        assert!((half.padding_top - 13.0).abs() < 1e-6);
        assert!((half.name.size - 10.0).abs() < 1e-6);
        assert!((half.section_title.char_spacing - 0.25).abs() < 1e-6);
        assert!((half.paragraph.line_height - 1.4).abs() < 1e-6);
        assert!((half.header_rule - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_one_is_identity() {
        assert_eq!(NOMINAL.scaled(1.0), NOMINAL);
    }
}
