//! Field-level edits applied to a session's document in place.
//!
//! Each edit replaces exactly one leaf field or one list element; siblings are
//! left untouched.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resume::{CustomSection, Education, Experience, Project, ResumeDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Name,
    Headline,
    Phone,
    Email,
    NetworkLink,
    Location,
    Summary,
    Skills,
    Awards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSection {
    Experiences,
    Projects,
    Education,
    CustomSections,
}

impl ListSection {
    fn len(&self, doc: &ResumeDocument) -> usize {
        match self {
            ListSection::Experiences => doc.experiences.len(),
            ListSection::Projects => doc.projects.len(),
            ListSection::Education => doc.education.len(),
            ListSection::CustomSections => doc.custom_sections.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ResumeEdit {
    SetText {
        field: TextField,
        value: String,
    },
    ReplaceExperience {
        index: usize,
        entry: Experience,
    },
    ReplaceProject {
        index: usize,
        entry: Project,
    },
    ReplaceEducation {
        index: usize,
        entry: Education,
    },
    ReplaceCustomSection {
        index: usize,
        entry: CustomSection,
    },
    /// Appends a blank entry to the end of the list.
    Append {
        section: ListSection,
    },
    Remove {
        section: ListSection,
        index: usize,
    },
}

impl ResumeEdit {
    /// Applies the edit to `doc`. On error the document is left unchanged.
    pub fn apply(self, doc: &mut ResumeDocument) -> Result<(), AppError> {
        match self {
            ResumeEdit::SetText { field, value } => {
                set_text(doc, field, value);
                Ok(())
            }
            ResumeEdit::ReplaceExperience { index, entry } => {
                replace_at(&mut doc.experiences, index, entry, "experiences")
            }
            ResumeEdit::ReplaceProject { index, entry } => {
                replace_at(&mut doc.projects, index, entry, "projects")
            }
            ResumeEdit::ReplaceEducation { index, entry } => {
                replace_at(&mut doc.education, index, entry, "education")
            }
            ResumeEdit::ReplaceCustomSection { index, entry } => {
                replace_at(&mut doc.custom_sections, index, entry, "custom_sections")
            }
            ResumeEdit::Append { section } => {
                match section {
                    ListSection::Experiences => doc.experiences.push(Experience::default()),
                    ListSection::Projects => doc.projects.push(Project::default()),
                    ListSection::Education => doc.education.push(Education::default()),
                    ListSection::CustomSections => {
                        doc.custom_sections.push(CustomSection::default())
                    }
                }
                Ok(())
            }
            ResumeEdit::Remove { section, index } => {
                let len = section.len(doc);
                if index >= len {
                    return Err(AppError::Validation(format!(
                        "{section:?} has no entry at index {index}"
                    )));
                }
                // While editing, every list section keeps at least one entry.
                if len == 1 {
                    return Err(AppError::Validation(format!(
                        "{section:?} must keep at least one entry"
                    )));
                }
                match section {
                    ListSection::Experiences => {
                        doc.experiences.remove(index);
                    }
                    ListSection::Projects => {
                        doc.projects.remove(index);
                    }
                    ListSection::Education => {
                        doc.education.remove(index);
                    }
                    ListSection::CustomSections => {
                        doc.custom_sections.remove(index);
                    }
                }
                Ok(())
            }
        }
    }
}

fn set_text(doc: &mut ResumeDocument, field: TextField, value: String) {
    let slot = match field {
        TextField::Skills => return doc.skills = value,
        TextField::Awards => return doc.awards = value,
        TextField::Name => &mut doc.identity.name,
        TextField::Headline => &mut doc.identity.headline,
        TextField::Phone => &mut doc.identity.phone,
        TextField::Email => &mut doc.identity.email,
        TextField::NetworkLink => &mut doc.identity.network_link,
        TextField::Location => &mut doc.identity.location,
        TextField::Summary => &mut doc.summary,
    };
    *slot = Some(value).filter(|v| !v.is_empty());
}

fn replace_at<T>(list: &mut [T], index: usize, entry: T, name: &str) -> Result<(), AppError> {
    let slot = list
        .get_mut(index)
        .ok_or_else(|| AppError::Validation(format!("{name} has no entry at index {index}")))?;
    *slot = entry;
    Ok(())
}
