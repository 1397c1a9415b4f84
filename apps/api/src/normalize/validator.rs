use serde::{Deserialize, Serialize};

use crate::models::resume::NormalizedDocument;
use crate::normalize::mapper::NAME_PLACEHOLDER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Minimal completeness check on a mapped document.
///
/// Every rule is evaluated; errors come back in checklist order
/// (name, education, skills, experience). Summary and projects are optional.
pub fn validate(doc: &NormalizedDocument) -> ValidationReport {
    let name = doc.name.trim();
    let checks = [
        (
            name.is_empty() || name == NAME_PLACEHOLDER,
            "Name is required",
        ),
        (
            doc.education.is_empty(),
            "At least one education entry is required",
        ),
        (
            doc.skills.is_empty(),
            "At least one skill category is required",
        ),
        (
            doc.experience.is_empty(),
            "At least one work experience entry is required",
        ),
    ];

    let errors: Vec<String> = checks
        .into_iter()
        .filter(|(failed, _)| *failed)
        .map(|(_, message)| message.to_string())
        .collect();

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
