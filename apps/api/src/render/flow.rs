//! Flow backend: the same sections as the page composer, as word-processor
//! paragraphs with no page positioning. Pagination is left to the reader app.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::models::resume::{Education, Experience, Project, ResumeDocument};
use crate::normalize::{bullet_items, contact_line, present};
use crate::render::sections::{
    or_placeholder, plan_sections, SectionBody, COMPANY_PLACEHOLDER, PROJECT_PLACEHOLDER,
    ROLE_PLACEHOLDER, SCHOOL_PLACEHOLDER,
};
use crate::render::{Artifact, ExportFormat, LayoutHints, RenderError, Renderer};

/// A4 in twentieths of a point.
const A4_TWIPS: (u32, u32) = (11906, 16838);
const BULLET_PREFIX: &str = "• ";
const ENTRY_SEPARATOR: &str = " — ";

// Run sizes are in half-points.
const NAME_SIZE: usize = 32;
const HEADLINE_SIZE: usize = 24;
const HEADING_SIZE: usize = 24;
const CONTACT_SIZE: usize = 20;
const BODY_SIZE: usize = 21;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowBlock {
    Name(String),
    Headline(String),
    Contact(String),
    Heading(String),
    Paragraph(String),
    /// Bold lead followed by plain detail, e.g. a role and its company.
    Entry { lead: String, detail: String },
    Bullet(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowDocument {
    pub blocks: Vec<FlowBlock>,
}

impl FlowDocument {
    pub fn from_resume(doc: &ResumeDocument) -> Self {
        let mut blocks = Vec::new();

        if let Some(name) = present(&doc.identity.name) {
            blocks.push(FlowBlock::Name(name.trim().to_string()));
        }
        if let Some(headline) = present(&doc.identity.headline) {
            blocks.push(FlowBlock::Headline(headline.trim().to_string()));
        }
        let contact = contact_line(&doc.identity);
        if !contact.is_empty() {
            blocks.push(FlowBlock::Contact(contact));
        }

        for section in plan_sections(doc) {
            blocks.push(FlowBlock::Heading(section.title));
            match section.body {
                SectionBody::Paragraph(text) | SectionBody::Link(text) => {
                    if !text.is_empty() {
                        blocks.push(FlowBlock::Paragraph(text));
                    }
                }
                SectionBody::Lines(lines) => {
                    blocks.extend(lines.into_iter().map(FlowBlock::Bullet));
                }
                SectionBody::Experiences(entries) => {
                    entries.iter().for_each(|e| experience_blocks(e, &mut blocks));
                }
                SectionBody::Projects(entries) => {
                    entries.into_iter().for_each(|p| project_blocks(p, &mut blocks));
                }
                SectionBody::Education(entries) => {
                    entries.iter().for_each(|e| education_blocks(e, &mut blocks));
                }
            }
        }

        Self { blocks }
    }

    /// Section headings in emitted order.
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                FlowBlock::Heading(title) => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_docx(&self) -> Docx {
        let (width, height) = A4_TWIPS;
        self.blocks
            .iter()
            .fold(Docx::new().page_size(width, height), |docx, block| {
                docx.add_paragraph(paragraph(block))
            })
    }
}

fn paragraph(block: &FlowBlock) -> Paragraph {
    let run = |text: &str, size: usize| Run::new().add_text(text).size(size);
    match block {
        FlowBlock::Name(text) => Paragraph::new().add_run(run(text, NAME_SIZE).bold()),
        FlowBlock::Headline(text) => Paragraph::new().add_run(run(text, HEADLINE_SIZE).bold()),
        FlowBlock::Contact(text) => Paragraph::new().add_run(run(text, CONTACT_SIZE)),
        FlowBlock::Heading(text) => Paragraph::new().add_run(run(text, HEADING_SIZE).bold()),
        FlowBlock::Paragraph(text) => Paragraph::new().add_run(run(text, BODY_SIZE)),
        FlowBlock::Entry { lead, detail } => {
            let paragraph = Paragraph::new().add_run(run(lead, BODY_SIZE).bold());
            if detail.is_empty() {
                paragraph
            } else {
                paragraph.add_run(run(detail, BODY_SIZE))
            }
        }
        FlowBlock::Bullet(text) => {
            Paragraph::new().add_run(run(&format!("{BULLET_PREFIX}{text}"), BODY_SIZE))
        }
    }
}

fn bullets(items: &[String], blocks: &mut Vec<FlowBlock>) {
    blocks.extend(
        bullet_items(items)
            .into_iter()
            .map(|item| FlowBlock::Bullet(item.to_string())),
    );
}

/// `title — company (dates)`; the parenthetical is dropped when dates are empty.
/// Blank titles and companies get the same placeholders as the vector page.
fn experience_blocks(entry: &Experience, blocks: &mut Vec<FlowBlock>) {
    let mut detail = format!(
        "{ENTRY_SEPARATOR}{}",
        or_placeholder(&entry.company, COMPANY_PLACEHOLDER)
    );
    let dates = entry.date_range.trim();
    if !dates.is_empty() {
        detail.push_str(&format!(" ({dates})"));
    }
    blocks.push(FlowBlock::Entry {
        lead: or_placeholder(&entry.title, ROLE_PLACEHOLDER).to_string(),
        detail,
    });
    bullets(&entry.bullets, blocks);
}

fn project_blocks(entry: &Project, blocks: &mut Vec<FlowBlock>) {
    let link = entry.link.trim();
    let detail = if link.is_empty() {
        String::new()
    } else {
        format!("{ENTRY_SEPARATOR}{link}")
    };
    blocks.push(FlowBlock::Entry {
        lead: or_placeholder(&entry.name, PROJECT_PLACEHOLDER).to_string(),
        detail,
    });
    bullets(&entry.bullets, blocks);
}

fn education_blocks(entry: &Education, blocks: &mut Vec<FlowBlock>) {
    let mut detail = String::new();
    let location = entry.location.trim();
    if !location.is_empty() {
        detail.push_str(ENTRY_SEPARATOR);
        detail.push_str(location);
    }
    let year = entry.year.trim();
    if !year.is_empty() {
        detail.push_str(&format!(" ({year})"));
    }
    blocks.push(FlowBlock::Entry {
        lead: or_placeholder(&entry.school, SCHOOL_PLACEHOLDER).to_string(),
        detail,
    });
    let degree = entry.degree.trim();
    if !degree.is_empty() {
        blocks.push(FlowBlock::Paragraph(degree.to_string()));
    }
}

pub struct FlowRenderer;

impl Renderer for FlowRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    /// Scale-independent; `hints` are ignored.
    fn render(&self, doc: &ResumeDocument, _hints: &LayoutHints) -> Result<Artifact, RenderError> {
        let flow = FlowDocument::from_resume(doc);
        let mut buf = Cursor::new(Vec::new());
        flow.to_docx()
            .build()
            .pack(&mut buf)
            .map_err(|e| RenderError::EncodingFailure {
                format: ExportFormat::Docx,
                message: e.to_string(),
            })?;

        Ok(Artifact {
            format: ExportFormat::Docx,
            file_name: ExportFormat::Docx.file_name(doc),
            bytes: buf.into_inner(),
            page_count: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::styles::A4;
    use crate::models::resume::CustomSection;
    use crate::render::page_tree::compose;

    #[test]
    fn test_section_order_matches_vector_page() {
        let mut docs = vec![ResumeDocument::default(), ResumeDocument::sample()];

        let mut crowded = ResumeDocument::sample();
        crowded.summary = None;
        crowded.awards.clear();
        crowded.projects.clear();
        crowded.custom_sections = vec![
            CustomSection {
                title: String::new(),
                content: "a\nb".to_string(),
            },
            CustomSection::default(),
            CustomSection {
                title: "Talks".to_string(),
                content: "RustConf 2024".to_string(),
            },
        ];
        docs.push(crowded);

        for doc in &docs {
            let tree = compose(doc, 1.0, A4);
            let flow = FlowDocument::from_resume(doc);
            assert_eq!(flow.headings(), tree.sections);
        }
    }

    #[test]
    fn test_header_blocks() {
        let flow = FlowDocument::from_resume(&ResumeDocument::sample());
        assert_eq!(flow.blocks[0], FlowBlock::Name("Jordan Reyes".to_string()));
        assert_eq!(
            flow.blocks[1],
            FlowBlock::Headline("Senior Backend Engineer".to_string())
        );
        match &flow.blocks[2] {
            FlowBlock::Contact(line) => assert!(line.contains("linkedin.com/in/jordanreyes")),
            other => panic!("expected contact line, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_identity_has_no_header_blocks() {
        let flow = FlowDocument::from_resume(&ResumeDocument::default());
        assert_eq!(flow.blocks[0], FlowBlock::Heading("Skills".to_string()));
    }

    #[test]
    fn test_experience_entry_format() {
        let mut blocks = Vec::new();
        experience_blocks(
            &Experience {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                date_range: "2020 – 2022".to_string(),
                bullets: vec!["Shipped".to_string(), "  ".to_string()],
            },
            &mut blocks,
        );
        assert_eq!(
            blocks,
            vec![
                FlowBlock::Entry {
                    lead: "Engineer".to_string(),
                    detail: " — Acme (2020 – 2022)".to_string(),
                },
                FlowBlock::Bullet("Shipped".to_string()),
            ]
        );
    }

    #[test]
    fn test_experience_without_dates_drops_parenthetical() {
        let mut blocks = Vec::new();
        experience_blocks(
            &Experience {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                ..Experience::default()
            },
            &mut blocks,
        );
        assert_eq!(
            blocks[0],
            FlowBlock::Entry {
                lead: "Engineer".to_string(),
                detail: " — Acme".to_string(),
            }
        );
    }

    #[test]
    fn test_education_degree_follows_entry() {
        let flow = FlowDocument::from_resume(&ResumeDocument::sample());
        let at = flow
            .blocks
            .iter()
            .position(|b| matches!(b, FlowBlock::Entry { lead, .. } if lead == "University of Texas at Austin"))
            .unwrap();
        assert_eq!(
            flow.blocks[at],
            FlowBlock::Entry {
                lead: "University of Texas at Austin".to_string(),
                detail: " — Austin, TX (2018)".to_string(),
            }
        );
        assert_eq!(
            flow.blocks[at + 1],
            FlowBlock::Paragraph("B.S. Computer Science".to_string())
        );
    }

    #[test]
    fn test_awards_are_bullets() {
        let flow = FlowDocument::from_resume(&ResumeDocument::sample());
        assert_eq!(
            flow.blocks.last(),
            Some(&FlowBlock::Bullet(
                "Engineering Excellence Award - Northwind - 2023".to_string()
            ))
        );
    }

    #[test]
    fn test_render_packs_a_zip() {
        let hints = LayoutHints { scale: 0.8, page: A4 };
        let artifact = FlowRenderer.render(&ResumeDocument::sample(), &hints).unwrap();
        assert!(artifact.bytes.starts_with(b"PK"));
        assert_eq!(artifact.page_count, None);
        assert_eq!(artifact.file_name, "Jordan_Reyes_Resume.docx");
    }
}
