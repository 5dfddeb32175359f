// Prompt construction for résumé suggestions, and applying an accepted suggestion.
// A suggestion only ever replaces the field it was generated for.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::normalize::{present, split_lines};

pub const SYSTEM_PROMPT: &str =
    "You are a resume writing assistant. Provide concise, professional output only.";

const ADDITIONAL_INSTRUCTIONS: &str = "\n\nAdditional instructions:\n";

const SUMMARY_INSTRUCTION: &str =
    "Write a 2-3 sentence professional resume summary in a confident tone. Avoid buzzwords.";
const SKILLS_INSTRUCTION: &str =
    "Suggest a concise, comma-separated skills list relevant to the role.";
const EXPERIENCE_INSTRUCTION: &str =
    "Write 3-5 achievement-focused bullet points with measurable impact.";
const AWARDS_INSTRUCTION: &str = "Create 2-3 resume award entries in a clean format.";
const MISSING_ROLE: &str = "Role details not provided.";

/// Which part of the document a suggestion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SuggestionTarget {
    Summary,
    Skills,
    Experience { index: usize },
    Awards,
}

/// Everything the collaborator sees for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptContext {
    pub target: SuggestionTarget,
    pub candidate: Option<String>,
    pub target_role: Option<String>,
    /// Target-specific context and instruction.
    pub section: String,
    pub extra_instructions: Option<String>,
}

impl PromptContext {
    pub fn build(doc: &ResumeDocument, target: SuggestionTarget, extra: Option<&str>) -> Self {
        let section = match target {
            SuggestionTarget::Summary => SUMMARY_INSTRUCTION.to_string(),
            SuggestionTarget::Skills => SKILLS_INSTRUCTION.to_string(),
            SuggestionTarget::Experience { index } => {
                let role = doc.experiences.get(index).map_or_else(
                    || MISSING_ROLE.to_string(),
                    |e| {
                        format!(
                            "Role: {}\nCompany: {}\nDates: {}",
                            e.title, e.company, e.date_range
                        )
                    },
                );
                format!("{role}\n{EXPERIENCE_INSTRUCTION}")
            }
            SuggestionTarget::Awards => AWARDS_INSTRUCTION.to_string(),
        };

        Self {
            target,
            candidate: present(&doc.identity.name).map(str::to_string),
            target_role: present(&doc.identity.headline).map(str::to_string),
            section,
            extra_instructions: extra
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// The user message sent to the collaborator.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(name) = &self.candidate {
            lines.push(format!("Candidate: {name}"));
        }
        if let Some(role) = &self.target_role {
            lines.push(format!("Target role: {role}"));
        }
        lines.push(self.section.clone());

        let prompt = lines.join("\n");
        match &self.extra_instructions {
            Some(extra) => format!("{prompt}{ADDITIONAL_INSTRUCTIONS}{extra}"),
            None => prompt,
        }
    }
}

/// Writes an accepted suggestion into `doc`. Text targets take the trimmed
/// text; experience bullets are the suggestion's non-empty lines.
pub fn apply_suggestion(
    doc: &mut ResumeDocument,
    target: SuggestionTarget,
    text: &str,
) -> Result<(), AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("suggestion is empty".to_string()));
    }

    match target {
        SuggestionTarget::Summary => doc.summary = Some(text.to_string()),
        SuggestionTarget::Skills => doc.skills = text.to_string(),
        SuggestionTarget::Awards => doc.awards = text.to_string(),
        SuggestionTarget::Experience { index } => {
            let len = doc.experiences.len();
            let entry = doc.experiences.get_mut(index).ok_or_else(|| {
                AppError::Validation(format!(
                    "experience index {index} out of range ({len} entries)"
                ))
            })?;
            entry.bullets = split_lines(text);
        }
    }
    Ok(())
}
