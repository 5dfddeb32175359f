//! The ordered section plan shared by the vector and flow renderers.
//!
//! Both backends walk the same plan, so they emit the same sections in the same
//! order with the same omission rules.

use serde::Serialize;

use crate::models::resume::{Education, Experience, Project, ResumeDocument};
use crate::normalize::{
    award_list, looks_like_link, present, skill_list, split_lines, visible_custom_sections,
};

pub const CUSTOM_SECTION_PLACEHOLDER: &str = "Additional Section";
pub const ROLE_PLACEHOLDER: &str = "Role";
pub const COMPANY_PLACEHOLDER: &str = "Company";
pub const SCHOOL_PLACEHOLDER: &str = "School";
pub const PROJECT_PLACEHOLDER: &str = "Project";

/// Trimmed `value`, or `fallback` when it is blank.
pub fn or_placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    match value.trim() {
        "" => fallback,
        trimmed => trimmed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
    Custom,
    Awards,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody<'a> {
    /// Free text; an empty string renders nothing under the heading.
    Paragraph(String),
    /// A body that is a single URL, rendered as a hyperlink.
    Link(String),
    /// Bullet-prefixed lines.
    Lines(Vec<String>),
    Experiences(&'a [Experience]),
    Projects(Vec<&'a Project>),
    Education(&'a [Education]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlan<'a> {
    pub kind: SectionKind,
    pub title: String,
    pub body: SectionBody<'a>,
}

/// Sections in render order: summary (if non-empty), skills, experience,
/// projects (if any), education, custom sections (non-blank, in list order),
/// awards (if non-empty).
pub fn plan_sections(doc: &ResumeDocument) -> Vec<SectionPlan<'_>> {
    let mut plan = Vec::new();

    if let Some(summary) = present(&doc.summary) {
        plan.push(SectionPlan {
            kind: SectionKind::Summary,
            title: "Summary".to_string(),
            body: SectionBody::Paragraph(summary.trim().to_string()),
        });
    }

    plan.push(SectionPlan {
        kind: SectionKind::Skills,
        title: "Skills".to_string(),
        body: SectionBody::Paragraph(skill_list(doc).join(", ")),
    });

    plan.push(SectionPlan {
        kind: SectionKind::Experience,
        title: "Experience".to_string(),
        body: SectionBody::Experiences(&doc.experiences),
    });

    let projects: Vec<&Project> = doc.projects.iter().filter(|p| !p.is_blank()).collect();
    if !projects.is_empty() {
        plan.push(SectionPlan {
            kind: SectionKind::Projects,
            title: "Projects".to_string(),
            body: SectionBody::Projects(projects),
        });
    }

    plan.push(SectionPlan {
        kind: SectionKind::Education,
        title: "Education".to_string(),
        body: SectionBody::Education(&doc.education),
    });

    for section in visible_custom_sections(doc) {
        let title = match section.title.trim() {
            "" => CUSTOM_SECTION_PLACEHOLDER.to_string(),
            title => title.to_string(),
        };
        let lines = split_lines(&section.content);
        let body = if lines.len() > 1 {
            SectionBody::Lines(lines)
        } else {
            let content = section.content.trim();
            if looks_like_link(content) {
                SectionBody::Link(content.to_string())
            } else {
                SectionBody::Paragraph(content.to_string())
            }
        };
        plan.push(SectionPlan {
            kind: SectionKind::Custom,
            title,
            body,
        });
    }

    let awards = award_list(doc);
    if !awards.is_empty() {
        plan.push(SectionPlan {
            kind: SectionKind::Awards,
            title: "Awards".to_string(),
            body: SectionBody::Lines(awards),
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::CustomSection;

    fn kinds(doc: &ResumeDocument) -> Vec<SectionKind> {
        plan_sections(doc).iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_empty_document_keeps_fixed_headers_only() {
        let doc = ResumeDocument::default();
        assert_eq!(
            kinds(&doc),
            vec![
                SectionKind::Skills,
                SectionKind::Experience,
                SectionKind::Education
            ]
        );
    }

    #[test]
    fn test_full_order() {
        let mut doc = ResumeDocument::sample();
        doc.custom_sections = vec![CustomSection {
            title: "Languages".to_string(),
            content: "English\nSpanish".to_string(),
        }];
        assert_eq!(
            kinds(&doc),
            vec![
                SectionKind::Summary,
                SectionKind::Skills,
                SectionKind::Experience,
                SectionKind::Projects,
                SectionKind::Education,
                SectionKind::Custom,
                SectionKind::Awards,
            ]
        );
    }

    #[test]
    fn test_whitespace_summary_and_awards_are_omitted() {
        let mut doc = ResumeDocument::sample();
        doc.summary = Some("   ".to_string());
        doc.awards = "\n \n".to_string();
        let k = kinds(&doc);
        assert!(!k.contains(&SectionKind::Summary));
        assert!(!k.contains(&SectionKind::Awards));
    }

    #[test]
    fn test_blank_projects_are_omitted() {
        let mut doc = ResumeDocument::sample();
        doc.projects = vec![Project::default()];
        assert!(!kinds(&doc).contains(&SectionKind::Projects));
    }

    #[test]
    fn test_custom_section_bodies() {
        let mut doc = ResumeDocument::default();
        doc.custom_sections = vec![
            CustomSection {
                title: String::new(),
                content: "one\ntwo".to_string(),
            },
            CustomSection {
                title: "Portfolio".to_string(),
                content: " https://example.com/work ".to_string(),
            },
            CustomSection {
                title: "Interests".to_string(),
                content: "Climbing and chess".to_string(),
            },
            CustomSection::default(),
        ];
        let plan = plan_sections(&doc);
        let custom: Vec<_> = plan
            .iter()
            .filter(|s| s.kind == SectionKind::Custom)
            .collect();
        assert_eq!(custom.len(), 3);
        assert_eq!(custom[0].title, CUSTOM_SECTION_PLACEHOLDER);
        assert_eq!(
            custom[0].body,
            SectionBody::Lines(vec!["one".to_string(), "two".to_string()])
        );
        assert_eq!(
            custom[1].body,
            SectionBody::Link("https://example.com/work".to_string())
        );
        assert_eq!(
            custom[2].body,
            SectionBody::Paragraph("Climbing and chess".to_string())
        );
    }

    #[test]
    fn test_skills_are_normalized() {
        let mut doc = ResumeDocument::default();
        doc.skills = "Java, SQL,  Go ,".to_string();
        let plan = plan_sections(&doc);
        assert_eq!(plan[0].body, SectionBody::Paragraph("Java, SQL, Go".to_string()));
    }
}
