//! Static advance-width tables for the two faces the vector backend embeds by name.
//!
//! Widths are in em units (AFM widths / 1000) for the PDF standard-14 Helvetica
//! and Helvetica-Bold. Because the PDF backend uses exactly these faces, a wrap
//! computed here is the wrap the exported page shows.
//! Tables cover ASCII 0x20..=0x7E; index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

/// Slack absorbed when comparing summed word widths against a line width, so a
/// string measured as exactly fitting is never split by float rounding.
const WRAP_EPSILON: f32 = 1e-3;

// ────────────────────────────────────────────────────────────────────────────
// Font weight
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// Standard-14 base font name for this weight.
    pub fn base_font(&self) -> &'static [u8] {
        match self {
            FontWeight::Regular => b"Helvetica",
            FontWeight::Bold => b"Helvetica-Bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback for characters outside the table.
    pub average_char_width: f32,
    pub bullet_width: f32,
    pub dash_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '•' => self.bullet_width,
            '–' => 0.556,
            '—' => self.dash_width,
            '·' => 0.278,
            '‘' | '’' => 0.222,
            '“' | '”' => 0.333,
            '…' => 1.0,
            _ => self.average_char_width,
        }
    }

    /// Rendered width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Rendered width in points at `size`, with `char_spacing` points added after
    /// every character.
    pub fn width_pt(&self, s: &str, size: f32, char_spacing: f32) -> f32 {
        let count = s.chars().count() as f32;
        self.measure_str(s) * size + count * char_spacing
    }

    /// Greedy word wrap of `text` into lines no wider than `max_width` points.
    ///
    /// A single word wider than the line is kept whole on its own line. An empty
    /// or whitespace-only string yields no lines.
    pub fn wrap(&self, text: &str, size: f32, char_spacing: f32, max_width: f32) -> Vec<String> {
        let space_w = self.width_pt(" ", size, char_spacing);
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.width_pt(word, size, char_spacing);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width + WRAP_EPSILON {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Returns the static metric table for a weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Regular => &HELVETICA_TABLE,
        FontWeight::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {     |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    bullet_width: 0.350,
    dash_width: 1.0,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {     |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    bullet_width: 0.350,
    dash_width: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_expected_anchor_widths() {
        let regular = get_metrics(FontWeight::Regular);
        let bold = get_metrics(FontWeight::Bold);
        assert!((regular.char_width(' ') - 0.278).abs() < 1e-6);
        assert!((regular.char_width('W') - 0.944).abs() < 1e-6);
        assert!((bold.char_width('b') - 0.611).abs() < 1e-6);
        assert!(bold.measure_str("Rust") > regular.measure_str("Rust"));
    }

    #[test]
    fn test_space_comes_from_width_table() {
        for weight in [FontWeight::Regular, FontWeight::Bold] {
            let m = get_metrics(weight);
            assert!((m.width_pt(" ", 10.0, 0.0) - 2.78).abs() < 1e-4);
            let joined = m.width_pt("ab cd", 10.0, 0.0);
            let parts = m.width_pt("ab", 10.0, 0.0) + m.width_pt("cd", 10.0, 0.0);
            assert!((joined - parts - 2.78).abs() < 1e-4);
        }
    }

    #[test]
    fn test_non_ascii_falls_back() {
        let regular = get_metrics(FontWeight::Regular);
        assert!((regular.char_width('•') - 0.350).abs() < 1e-6);
        assert!((regular.char_width('ж') - regular.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_width_pt_adds_char_spacing() {
        let m = get_metrics(FontWeight::Regular);
        let plain = m.width_pt("abc", 10.0, 0.0);
        let spaced = m.width_pt("abc", 10.0, 0.5);
        assert!((spaced - plain - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_empty_is_no_lines() {
        let m = get_metrics(FontWeight::Regular);
        assert!(m.wrap("   ", 9.0, 0.0, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        let m = get_metrics(FontWeight::Regular);
        assert_eq!(m.wrap("hello world", 9.0, 0.0, 500.0), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_and_respects_width() {
        let m = get_metrics(FontWeight::Regular);
        let text = "word ".repeat(60);
        let lines = m.wrap(&text, 9.0, 0.0, 120.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(m.width_pt(line, 9.0, 0.0) <= 120.0 + 2e-3, "{line:?} overflows");
        }
        assert_eq!(lines.join(" "), text.trim());
    }

    #[test]
    fn test_wrap_exact_width_stays_on_one_line() {
        let m = get_metrics(FontWeight::Bold);
        let text = "Mar 2021 – Present";
        let width = m.width_pt(text, 8.5, 0.0);
        assert_eq!(m.wrap(text, 8.5, 0.0, width), vec![text]);
    }

    #[test]
    fn test_wrap_keeps_overlong_word_whole() {
        let m = get_metrics(FontWeight::Regular);
        let lines = m.wrap("a supercalifragilisticexpialidocious b", 9.0, 0.0, 20.0);
        assert_eq!(lines, vec!["a", "supercalifragilisticexpialidocious", "b"]);
    }

    #[test]
    fn test_wider_column_never_adds_lines() {
        let m = get_metrics(FontWeight::Regular);
        let text = "Designed and executed an end-to-end benchmarking framework comparing models \
                    for complex reasoning tasks including classification and ontology mapping.";
        let narrow = m.wrap(text, 8.5, 0.0, 200.0).len();
        let wide = m.wrap(text, 8.5, 0.0, 260.0).len();
        assert!(wide <= narrow);
    }
}
