//! Content Normalizer: turns raw editable strings into render-ready collections.
//!
//! Every renderer goes through these functions instead of splitting text itself,
//! so the vector, flow and raster outputs stay content-identical.

use serde::Serialize;

use crate::models::resume::{CustomSection, Identity, ResumeDocument};

/// Separator placed between contact items on the header line.
pub const CONTACT_SEPARATOR: &str = " · ";

const DEFAULT_SCHEME: &str = "https://";
const KNOWN_SCHEMES: &[&str] = &["http://", "https://", "mailto:", "tel:", "ftp://"];

/// Splits on line breaks, trims each line and drops empty ones. Order is preserved.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on `delimiter`, trims each entry and drops empty ones.
/// Duplicates and ordering are kept exactly as typed.
pub fn split_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-delimited skills.
pub fn skill_list(doc: &ResumeDocument) -> Vec<String> {
    split_list(&doc.skills, ',')
}

/// Newline-delimited awards.
pub fn award_list(doc: &ResumeDocument) -> Vec<String> {
    split_lines(&doc.awards)
}

/// Bullet strings worth rendering: trimmed, blanks dropped.
pub fn bullet_items(bullets: &[String]) -> Vec<&str> {
    bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect()
}

/// Prefixes a default scheme unless one is already present (case-insensitive).
/// Empty input yields empty output.
pub fn normalize_link(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

fn has_scheme(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    KNOWN_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// True when a line of free text is nothing but a link.
pub fn looks_like_link(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && !trimmed.contains(char::is_whitespace)
        && (has_scheme(trimmed) || trimmed.to_ascii_lowercase().starts_with("www."))
}

/// Returns the value if it holds anything besides whitespace.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// One entry on the contact line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactItem {
    pub label: String,
    /// Hyperlink target; only the network link carries one.
    pub href: Option<String>,
}

/// Contact items in fixed order (phone, email, network link, location), skipping
/// absent ones. The stored network link is read, never rewritten.
pub fn contact_items(identity: &Identity) -> Vec<ContactItem> {
    let plain = |value: &Option<String>| {
        present(value).map(|label| ContactItem {
            label: label.to_string(),
            href: None,
        })
    };

    [
        plain(&identity.phone),
        plain(&identity.email),
        present(&identity.network_link).map(|label| ContactItem {
            label: label.to_string(),
            href: Some(normalize_link(label)),
        }),
        plain(&identity.location),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// The contact line as a single string, for backends without inline links.
pub fn contact_line(identity: &Identity) -> String {
    contact_items(identity)
        .into_iter()
        .map(|item| item.label)
        .collect::<Vec<_>>()
        .join(CONTACT_SEPARATOR)
}

/// Custom sections that will actually be rendered, in list order.
pub fn visible_custom_sections(doc: &ResumeDocument) -> Vec<&CustomSection> {
    doc.custom_sections.iter().filter(|s| !s.is_blank()).collect()
}

/// Characters never carried into an export file name.
const FILE_NAME_RESERVED: &[char] = &['"', '\\', '/', ';', ':', '*', '?', '<', '>', '|'];

/// Export file stem: reserved and control characters dropped, whitespace runs
/// collapsed to `_`, or `Resume` when nothing is left.
pub fn file_stem(identity: &Identity) -> String {
    let name: String = present(&identity.name)
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .filter(|c| !FILE_NAME_RESERVED.contains(c))
        .collect();
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "Resume".to_string()
    } else {
        stem
    }
}
