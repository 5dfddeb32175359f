//! The canonical resume document edited in a session and read by every renderer.

use serde::{Deserialize, Serialize};

/// Who the resume belongs to. Every contact channel is optional; an empty or
/// whitespace-only value is treated as absent by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Professional-network profile URL, stored exactly as typed.
    pub network_link: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub date_range: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    /// URL or empty.
    pub link: String,
    pub bullets: Vec<String>,
}

impl Project {
    /// A freshly appended project with nothing filled in is not rendered.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.link.trim().is_empty()
            && self.bullets.iter().all(|b| b.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub location: String,
    pub year: String,
    pub degree: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    pub title: String,
    pub content: String,
}

impl CustomSection {
    /// A section with neither a title nor content is never rendered.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Root entity of an editing session.
///
/// `skills` is comma-delimited and `awards` newline-delimited free text; both
/// are split by `crate::normalize` at render time and never stored pre-split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub identity: Identity,
    pub summary: Option<String>,
    pub skills: String,
    pub experiences: Vec<Experience>,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub custom_sections: Vec<CustomSection>,
    pub awards: String,
}

impl ResumeDocument {
    /// The document a fresh session starts with: one filled-in example per section
    /// so the preview is never empty.
    pub fn sample() -> Self {
        Self {
            identity: Identity {
                name: Some("Jordan Reyes".to_string()),
                headline: Some("Senior Backend Engineer".to_string()),
                phone: Some("+1-555-0142".to_string()),
                email: Some("jordan.reyes@example.com".to_string()),
                network_link: Some("linkedin.com/in/jordanreyes".to_string()),
                location: Some("Austin, TX".to_string()),
            },
            summary: Some(
                "Backend engineer with 6 years of experience designing and scaling distributed, \
                 high-throughput services. Comfortable owning systems end to end, from data model \
                 to on-call."
                    .to_string(),
            ),
            skills: "Rust, Go, PostgreSQL, Kafka, Kubernetes, gRPC, Terraform".to_string(),
            experiences: vec![Experience {
                title: "Senior Backend Engineer".to_string(),
                company: "Northwind Logistics".to_string(),
                date_range: "Mar 2021 – Present".to_string(),
                bullets: vec![
                    "Rebuilt the shipment tracking pipeline in Rust, cutting p99 latency from 900ms to 120ms."
                        .to_string(),
                    "Led migration of 40 services to Kubernetes with zero customer-facing downtime."
                        .to_string(),
                ],
            }],
            projects: vec![Project {
                name: "tidewatch".to_string(),
                link: "github.com/jreyes/tidewatch".to_string(),
                bullets: vec!["Open-source tide prediction service serving 2k daily users.".to_string()],
            }],
            education: vec![Education {
                school: "University of Texas at Austin".to_string(),
                location: "Austin, TX".to_string(),
                year: "2018".to_string(),
                degree: "B.S. Computer Science".to_string(),
            }],
            custom_sections: vec![CustomSection::default()],
            awards: "Engineering Excellence Award - Northwind - 2023".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_custom_section_detection() {
        assert!(CustomSection::default().is_blank());
        assert!(CustomSection {
            title: "  ".to_string(),
            content: "\n".to_string()
        }
        .is_blank());
        assert!(!CustomSection {
            title: String::new(),
            content: "Volunteering".to_string()
        }
        .is_blank());
    }

    #[test]
    fn test_document_deserializes_with_missing_sections() {
        let doc: ResumeDocument =
            serde_json::from_str(r#"{"identity":{"name":"Ada"},"skills":"Rust"}"#).unwrap();
        assert_eq!(doc.identity.name.as_deref(), Some("Ada"));
        assert!(doc.experiences.is_empty());
        assert!(doc.projects.is_empty());
        assert!(doc.summary.is_none());
    }

    #[test]
    fn test_sample_has_one_entry_per_list_section() {
        let doc = ResumeDocument::sample();
        assert_eq!(doc.experiences.len(), 1);
        assert_eq!(doc.projects.len(), 1);
        assert_eq!(doc.education.len(), 1);
        assert_eq!(doc.custom_sections.len(), 1);
    }
}
