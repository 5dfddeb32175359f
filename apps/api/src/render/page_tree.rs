//! Page composer: lays the document out as a single page of positioned nodes.
//!
//! The same tree serves three purposes: at scale 1 it is the natural measurement
//! the auto-fit engine reads, at the committed scale it is the live preview, and
//! it is what the vector backend encodes. Coordinates are top-down: `top` is the
//! distance from the page's top edge to the top of a line box.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontWeight};
use crate::layout::styles::{PageSpec, Rgb, Styles, TextStyle, LINK, NOMINAL, RULE};
use crate::models::resume::{Education, Experience, Identity, Project, ResumeDocument};
use crate::normalize::{bullet_items, contact_items, normalize_link, present, CONTACT_SEPARATOR};
use crate::render::sections::{
    or_placeholder, plan_sections, SectionBody, SectionPlan, COMPANY_PLACEHOLDER,
    PROJECT_PLACEHOLDER, ROLE_PLACEHOLDER, SCHOOL_PLACEHOLDER,
};

/// Largest share of the column a right-aligned aside (dates, links) may take.
const ASIDE_MAX_SHARE: f32 = 0.45;
const BULLET_PREFIX: &str = "• ";

// ────────────────────────────────────────────────────────────────────────────
// Tree types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Name,
    Headline,
    Contact,
    SectionTitle,
    Body,
    EntryTitle,
    EntrySubtitle,
    EntryAside,
    ListItem,
}

/// One line (or inline run) of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub role: TextRole,
    pub text: String,
    pub x: f32,
    pub top: f32,
    pub width: f32,
    pub size: f32,
    pub line_advance: f32,
    pub weight: FontWeight,
    pub color: Rgb,
    pub char_spacing: f32,
    /// Hyperlink target, already normalized.
    pub link: Option<String>,
}

/// A horizontal rule; `top` is the top edge of the stroke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleNode {
    pub x: f32,
    pub top: f32,
    pub width: f32,
    pub thickness: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageNode {
    Text(TextNode),
    Rule(RuleNode),
}

#[derive(Debug, Clone, Serialize)]
pub struct PageTree {
    pub page: PageSpec,
    pub scale: f32,
    /// Where content starts (the scaled top padding).
    pub content_top: f32,
    /// Where the last block ends.
    pub content_bottom: f32,
    pub padding_bottom: f32,
    /// Section headings in emitted order, as written (not upper-cased).
    pub sections: Vec<String>,
    pub nodes: Vec<PageNode>,
}

impl PageTree {
    pub fn content_height(&self) -> f32 {
        self.content_bottom - self.content_top
    }

    /// True when the laid-out content runs past the page's bottom padding.
    pub fn overflows(&self) -> bool {
        self.content_bottom + self.padding_bottom > self.page.height + 0.01
    }

    pub fn text_nodes(&self) -> impl Iterator<Item = &TextNode> {
        self.nodes.iter().filter_map(|n| match n {
            PageNode::Text(t) => Some(t),
            PageNode::Rule(_) => None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `doc` on one `page` with every dimension multiplied by `scale`.
///
/// No pagination happens here: the caller picks a scale that makes the content
/// fit, and the composer never re-measures.
pub fn compose(doc: &ResumeDocument, scale: f32, page: PageSpec) -> PageTree {
    let styles = NOMINAL.scaled(scale);
    let mut composer = Composer::new(styles, page);

    composer.header(&doc.identity);
    for section in plan_sections(doc) {
        composer.section(&section);
    }

    PageTree {
        page,
        scale,
        content_top: styles.padding_top,
        content_bottom: composer.y,
        padding_bottom: styles.padding_bottom,
        sections: composer.sections,
        nodes: composer.nodes,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Composer {
    styles: Styles,
    left: f32,
    right: f32,
    y: f32,
    nodes: Vec<PageNode>,
    sections: Vec<String>,
}

impl Composer {
    fn new(styles: Styles, page: PageSpec) -> Self {
        Self {
            styles,
            left: styles.padding_x,
            right: page.width - styles.padding_x,
            y: styles.padding_top,
            nodes: Vec::new(),
            sections: Vec::new(),
        }
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Wraps `text` into the region starting at `x` and pushes one node per line.
    /// Returns the height consumed. Does not move the cursor.
    #[allow(clippy::too_many_arguments)]
    fn place_lines(
        &mut self,
        text: &str,
        style: TextStyle,
        role: TextRole,
        x: f32,
        width: f32,
        align: Align,
        top: f32,
        link: Option<&str>,
    ) -> f32 {
        let metrics = get_metrics(style.weight);
        let lines = metrics.wrap(text, style.size, style.char_spacing, width);
        let advance = style.line_advance();
        let height = lines.len() as f32 * advance;

        for (i, line) in lines.into_iter().enumerate() {
            let line_width = metrics.width_pt(&line, style.size, style.char_spacing);
            let line_x = match align {
                Align::Left => x,
                Align::Right => x + width - line_width,
            };
            self.nodes.push(PageNode::Text(TextNode {
                role,
                text: line,
                x: line_x,
                top: top + i as f32 * advance,
                width: line_width,
                size: style.size,
                line_advance: advance,
                weight: style.weight,
                color: style.color,
                char_spacing: style.char_spacing,
                link: link.map(str::to_string),
            }));
        }
        height
    }

    /// Full-width left-aligned block at the cursor; advances the cursor.
    fn block(&mut self, text: &str, style: TextStyle, role: TextRole, indent: f32, link: Option<&str>) {
        let (x, width, top) = (self.left + indent, self.width() - indent, self.y);
        self.y += self.place_lines(text, style, role, x, width, Align::Left, top, link);
    }

    // ── header ──────────────────────────────────────────────────────────────

    fn header(&mut self, identity: &Identity) {
        let s = self.styles;

        if let Some(name) = present(&identity.name) {
            self.block(name.trim(), s.name, TextRole::Name, 0.0, None);
            self.y += s.name_gap;
        }
        if let Some(headline) = present(&identity.headline) {
            self.block(headline.trim(), s.headline, TextRole::Headline, 0.0, None);
            self.y += s.headline_gap;
        }
        self.contact_line(identity);

        self.y += s.header_padding_bottom;
        self.nodes.push(PageNode::Rule(RuleNode {
            x: self.left,
            top: self.y,
            width: self.width(),
            thickness: s.header_rule,
            color: RULE,
        }));
        self.y += s.header_rule + s.header_gap;
    }

    /// Contact items laid out inline, wrapping whole runs onto the next line.
    fn contact_line(&mut self, identity: &Identity) {
        let items = contact_items(identity);
        if items.is_empty() {
            return;
        }
        let style = self.styles.contact;
        let metrics = get_metrics(style.weight);
        let advance = style.line_advance();

        let mut runs: Vec<(String, Option<String>)> = Vec::new();
        let last = items.len() - 1;
        for (i, item) in items.into_iter().enumerate() {
            runs.push((item.label, item.href));
            if i < last {
                runs.push((CONTACT_SEPARATOR.to_string(), None));
            }
        }

        let mut x = self.left;
        let mut top = self.y;
        for (text, href) in runs {
            let width = metrics.width_pt(&text, style.size, style.char_spacing);
            if x > self.left && x + width > self.right {
                top += advance;
                x = self.left;
            }
            let color = if href.is_some() { LINK } else { style.color };
            self.nodes.push(PageNode::Text(TextNode {
                role: TextRole::Contact,
                text,
                x,
                top,
                width,
                size: style.size,
                line_advance: advance,
                weight: style.weight,
                color,
                char_spacing: style.char_spacing,
                link: href,
            }));
            x += width;
        }
        self.y = top + advance;
    }

    // ── sections ────────────────────────────────────────────────────────────

    fn section(&mut self, section: &SectionPlan<'_>) {
        let s = self.styles;
        self.sections.push(section.title.clone());
        self.block(
            &section.title.to_uppercase(),
            s.section_title,
            TextRole::SectionTitle,
            0.0,
            None,
        );
        self.y += s.section_title_gap;

        match &section.body {
            SectionBody::Paragraph(text) => {
                self.block(text, s.paragraph, TextRole::Body, 0.0, None);
            }
            SectionBody::Link(text) => {
                let style = TextStyle {
                    color: LINK,
                    ..s.paragraph
                };
                let href = normalize_link(text);
                self.block(text, style, TextRole::Body, 0.0, Some(&href));
            }
            SectionBody::Lines(lines) => {
                let items: Vec<&str> = lines.iter().map(String::as_str).collect();
                self.list(&items);
            }
            SectionBody::Experiences(entries) => {
                for entry in *entries {
                    self.experience(entry);
                }
            }
            SectionBody::Projects(entries) => {
                for entry in entries {
                    self.project(entry);
                }
            }
            SectionBody::Education(entries) => {
                for entry in *entries {
                    self.education(entry);
                }
            }
        }

        self.y += s.section_gap;
    }

    fn experience(&mut self, entry: &Experience) {
        let s = self.styles;
        let title = or_placeholder(&entry.title, ROLE_PLACEHOLDER);
        let company = or_placeholder(&entry.company, COMPANY_PLACEHOLDER);
        self.row(
            &[
                (title, s.entry_title, TextRole::EntryTitle, 0.0),
                (company, s.entry_subtitle, TextRole::EntrySubtitle, s.entry_subtitle_top),
            ],
            Some((entry.date_range.trim(), s.entry_aside, None)),
        );
        self.list(&bullet_items(&entry.bullets));
        self.y += s.role_gap;
    }

    fn project(&mut self, entry: &Project) {
        let s = self.styles;
        let name = or_placeholder(&entry.name, PROJECT_PLACEHOLDER);
        let link = entry.link.trim();
        let href = normalize_link(link);
        self.row(
            &[(name, s.project_title, TextRole::EntryTitle, 0.0)],
            Some((link, s.project_link, Some(href.as_str()))),
        );
        self.y += s.project_title_gap;
        self.list(&bullet_items(&entry.bullets));
        self.y += s.role_gap;
    }

    fn education(&mut self, entry: &Education) {
        let s = self.styles;
        let school = or_placeholder(&entry.school, SCHOOL_PLACEHOLDER);
        let mut left = vec![(school, s.entry_title, TextRole::EntryTitle, 0.0)];
        let location = entry.location.trim();
        if !location.is_empty() {
            left.push((location, s.entry_subtitle, TextRole::EntrySubtitle, s.entry_subtitle_top));
        }
        self.row(&left, Some((entry.year.trim(), s.entry_aside, None)));
        let degree = entry.degree.trim();
        if !degree.is_empty() {
            self.block(degree, s.paragraph, TextRole::Body, 0.0, None);
        }
        self.y += s.education_gap;
    }

    /// A left column of stacked parts paired with a right-aligned aside.
    /// The row is as tall as the taller side.
    fn row(
        &mut self,
        left: &[(&str, TextStyle, TextRole, f32)],
        aside: Option<(&str, TextStyle, Option<&str>)>,
    ) {
        let top = self.y;
        let aside = aside.filter(|(text, _, _)| !text.is_empty());

        let (aside_width, gap) = match aside {
            Some((text, style, _)) => {
                let natural = get_metrics(style.weight).width_pt(text, style.size, style.char_spacing);
                (natural.min(self.width() * ASIDE_MAX_SHARE), self.styles.row_gap)
            }
            None => (0.0, 0.0),
        };
        let left_width = self.width() - aside_width - gap;

        let mut left_height = 0.0;
        for (text, style, role, top_gap) in left {
            left_height += top_gap;
            left_height += self.place_lines(
                text,
                *style,
                *role,
                self.left,
                left_width,
                Align::Left,
                top + left_height,
                None,
            );
        }

        let aside_height = match aside {
            Some((text, style, link)) => self.place_lines(
                text,
                style,
                TextRole::EntryAside,
                self.right - aside_width,
                aside_width,
                Align::Right,
                top,
                link,
            ),
            None => 0.0,
        };

        self.y = top + f32::max(left_height, aside_height);
    }

    fn list(&mut self, items: &[&str]) {
        if items.is_empty() {
            return;
        }
        let s = self.styles;
        self.y += s.list_top;
        for item in items {
            let text = format!("{BULLET_PREFIX}{item}");
            self.block(&text, s.list_item, TextRole::ListItem, s.list_indent, None);
            self.y += s.list_item_gap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::styles::A4;

    fn long_document(experiences: usize) -> ResumeDocument {
        let mut doc = ResumeDocument::sample();
        let template = doc.experiences[0].clone();
        doc.experiences = (0..experiences)
            .map(|i| Experience {
                title: format!("Engineer {i}"),
                bullets: vec![
                    "Designed and shipped a multi-region event pipeline handling 2M events per minute with exactly-once delivery.".to_string();
                    4
                ],
                ..template.clone()
            })
            .collect();
        doc
    }

    #[test]
    fn test_sections_recorded_in_order() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        assert_eq!(
            tree.sections,
            vec!["Summary", "Skills", "Experience", "Projects", "Education", "Awards"]
        );
    }

    #[test]
    fn test_section_titles_are_uppercase() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        let titles: Vec<&str> = tree
            .text_nodes()
            .filter(|t| t.role == TextRole::SectionTitle)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(titles[0], "SUMMARY");
    }

    #[test]
    fn test_network_link_is_hyperlinked_and_others_plain() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        let contacts: Vec<&TextNode> = tree
            .text_nodes()
            .filter(|t| t.role == TextRole::Contact && t.text != CONTACT_SEPARATOR)
            .collect();
        assert_eq!(contacts.len(), 4);
        assert_eq!(contacts[0].link, None);
        assert_eq!(contacts[1].link, None);
        assert_eq!(contacts[2].text, "linkedin.com/in/jordanreyes");
        assert_eq!(
            contacts[2].link.as_deref(),
            Some("https://linkedin.com/in/jordanreyes")
        );
        assert_eq!(contacts[3].link, None);
    }

    #[test]
    fn test_project_link_is_hyperlinked() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        let link = tree
            .text_nodes()
            .find(|t| t.role == TextRole::EntryAside && t.link.is_some())
            .expect("project link node");
        assert_eq!(link.link.as_deref(), Some("https://github.com/jreyes/tidewatch"));
    }

    #[test]
    fn test_dates_are_right_aligned() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        let dates = tree
            .text_nodes()
            .find(|t| t.text == "Mar 2021 – Present")
            .expect("dates node");
        let right_edge = A4.width - NOMINAL.padding_x;
        assert!((dates.x + dates.width - right_edge).abs() < 0.01);
    }

    #[test]
    fn test_empty_lists_render_headers_only() {
        let doc = ResumeDocument::default();
        let tree = compose(&doc, 1.0, A4);
        assert_eq!(tree.sections, vec!["Skills", "Experience", "Education"]);
        assert!(tree
            .text_nodes()
            .all(|t| t.role == TextRole::SectionTitle));
        assert!(tree.content_height() > 0.0);
    }

    #[test]
    fn test_placeholders_for_empty_entries() {
        let mut doc = ResumeDocument::default();
        doc.experiences = vec![Experience::default()];
        doc.education = vec![Education::default()];
        let tree = compose(&doc, 1.0, A4);
        let texts: Vec<&str> = tree.text_nodes().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"Role"));
        assert!(texts.contains(&"Company"));
        assert!(texts.contains(&"School"));
    }

    #[test]
    fn test_bullets_are_prefixed_and_indented() {
        let tree = compose(&ResumeDocument::sample(), 1.0, A4);
        let item = tree
            .text_nodes()
            .find(|t| t.role == TextRole::ListItem)
            .expect("list item");
        assert!(item.text.starts_with("• "));
        assert!((item.x - (NOMINAL.padding_x + NOMINAL.list_indent)).abs() < 1e-3);
    }

    #[test]
    fn test_long_document_overflows_at_full_scale() {
        let tree = compose(&long_document(12), 1.0, A4);
        assert!(tree.overflows());
    }

    #[test]
    fn test_scaled_height_never_exceeds_proportional_height() {
        let doc = long_document(12);
        let natural = compose(&doc, 1.0, A4).content_height();
        for scale in [0.9_f32, 0.75, 0.5, 0.33] {
            let scaled = compose(&doc, scale, A4).content_height();
            assert!(
                scaled <= natural * scale + 0.01,
                "scale {scale}: {scaled} > {}",
                natural * scale
            );
        }
    }

    #[test]
    fn test_every_node_within_page_width() {
        let tree = compose(&long_document(3), 0.8, A4);
        for node in tree.text_nodes() {
            assert!(node.x >= 0.0);
            assert!(node.x + node.width <= A4.width, "{:?} overflows", node.text);
        }
    }
}
